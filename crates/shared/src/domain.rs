use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! code_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

code_newtype!(TeacherInitial);
code_newtype!(CourseId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseCategory {
    #[default]
    Theory,
    Sessional,
}

impl CourseCategory {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Theory => "theory",
            Self::Sessional => "sessional",
        }
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl std::str::FromStr for CourseCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "theory" => Ok(Self::Theory),
            "sessional" => Ok(Self::Sessional),
            other => Err(format!("unknown course category '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseItem {
    pub course_id: CourseId,
    pub name: String,
}

impl CourseItem {
    pub fn new(course_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            course_id: CourseId(course_id.into()),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherSummary {
    pub initial: TeacherInitial,
    pub name: String,
}
