use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub location_id: i32,
    pub region_name: String,
    pub department_name: String,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Location {
    /// "Department, Region" label used in list views
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.department_name, self.region_name)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLocation {
    pub region_name: String,
    pub department_name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLocation {
    pub region_name: Option<String>,
    pub department_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    pub region_name: Option<String>,
    pub department_name: Option<String>,
}

/// How a caller identifies a location: an existing id, or a
/// (department, region) pair that is found or created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum LocationSelector {
    Id(i32),
    Named {
        department_name: String,
        region_name: String,
    },
}

impl LocationSelector {
    /// Build a selector from the loose request fields. An explicit id wins;
    /// department and region must be supplied together.
    pub fn from_parts(
        id: Option<i32>,
        department_name: Option<String>,
        region_name: Option<String>,
    ) -> Result<Option<Self>, &'static str> {
        if let Some(id) = id {
            return Ok(Some(Self::Id(id)));
        }

        match (department_name, region_name) {
            (None, None) => Ok(None),
            (Some(department_name), Some(region_name)) => {
                let department_name = department_name.trim().to_string();
                let region_name = region_name.trim().to_string();
                if department_name.is_empty() || region_name.is_empty() {
                    return Err("Department and region names cannot be empty");
                }
                Ok(Some(Self::Named {
                    department_name,
                    region_name,
                }))
            }
            _ => Err("Department and region must be provided together"),
        }
    }
}
