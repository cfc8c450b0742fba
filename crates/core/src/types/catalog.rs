//! Department and subject catalog.
//!
//! The catalog is fixed: every department code and its subject list is known
//! at compile time. Notices may additionally target the sentinel audience
//! `all`, which is not a department.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing catalog values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The department code is not part of the catalog.
    #[error("unknown department: {0}")]
    UnknownDepartment(String),
    /// The subject does not belong to the given department.
    #[error("subject '{subject}' is not offered by {department}")]
    UnknownSubject {
        /// Department that was searched.
        department: Department,
        /// Subject that was not found.
        subject: String,
    },
}

/// An academic department.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Cse,
    Ece,
    Me,
    Ce,
    Eee,
    Aiml,
    Ds,
    It,
}

impl Department {
    /// Every department, in catalog order.
    pub const ALL: [Self; 8] = [
        Self::Cse,
        Self::Ece,
        Self::Me,
        Self::Ce,
        Self::Eee,
        Self::Aiml,
        Self::Ds,
        Self::It,
    ];

    /// Short code stored in the database (e.g. `cse`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cse => "cse",
            Self::Ece => "ece",
            Self::Me => "me",
            Self::Ce => "ce",
            Self::Eee => "eee",
            Self::Aiml => "aiml",
            Self::Ds => "ds",
            Self::It => "it",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cse => "Computer Science",
            Self::Ece => "Electronics",
            Self::Me => "Mechanical",
            Self::Ce => "Civil",
            Self::Eee => "Electrical",
            Self::Aiml => "AI & ML",
            Self::Ds => "Data Science",
            Self::It => "Information Technology",
        }
    }

    /// Subjects offered by this department, in catalog order.
    #[must_use]
    pub const fn subjects(self) -> &'static [&'static str] {
        match self {
            Self::Cse => &[
                "Data Structures",
                "Algorithms",
                "DBMS",
                "Operating Systems",
                "Computer Networks",
                "Software Engineering",
            ],
            Self::Ece => &[
                "Digital Electronics",
                "Signals & Systems",
                "Communication Systems",
                "VLSI",
                "Microprocessors",
            ],
            Self::Me => &[
                "Thermodynamics",
                "Fluid Mechanics",
                "Machine Design",
                "Manufacturing",
            ],
            Self::Ce => &[
                "Structural Analysis",
                "Surveying",
                "Construction Management",
                "Geotechnical Engineering",
            ],
            Self::Eee => &[
                "Power Systems",
                "Control Systems",
                "Electrical Machines",
                "Power Electronics",
            ],
            Self::Aiml => &[
                "Machine Learning",
                "Deep Learning",
                "NLP",
                "Computer Vision",
                "Data Mining",
            ],
            Self::Ds => &[
                "Statistics",
                "Data Mining",
                "Big Data Analytics",
                "Machine Learning",
                "Data Visualization",
            ],
            Self::It => &[
                "Web Development",
                "Database Systems",
                "Networking",
                "Cloud Computing",
                "Cybersecurity",
            ],
        }
    }

    /// Returns `true` if `subject` is part of this department's catalog.
    #[must_use]
    pub fn offers(self, subject: &str) -> bool {
        self.subjects().contains(&subject)
    }

    /// Check that `subject` belongs to this department.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownSubject` if it does not.
    pub fn require_subject(self, subject: &str) -> Result<(), CatalogError> {
        if self.offers(subject) {
            Ok(())
        } else {
            Err(CatalogError::UnknownSubject {
                department: self,
                subject: subject.to_owned(),
            })
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Department {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.code() == s)
            .ok_or_else(|| CatalogError::UnknownDepartment(s.to_owned()))
    }
}

/// Audience of a notice: one department, or every department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeTarget {
    /// The `all` sentinel.
    All,
    /// A single department.
    Department(Department),
}

impl NoticeTarget {
    /// Code stored in the `notices.department` column.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Department(d) => d.code(),
        }
    }

    /// Returns `true` if a notice with this target is visible to `department`.
    #[must_use]
    pub fn reaches(self, department: Department) -> bool {
        match self {
            Self::All => true,
            Self::Department(d) => d == department,
        }
    }
}

impl fmt::Display for NoticeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for NoticeTarget {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Department)
        }
    }
}

impl From<Department> for NoticeTarget {
    fn from(department: Department) -> Self {
        Self::Department(department)
    }
}

impl Serialize for NoticeTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for NoticeTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
