//! City information shown alongside a line search.

/// A county (shahrestan) a city belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct County {
    pub id: i64,
    pub name: String,
    pub state_id: String,
}

/// A state (ostan) a city belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub id: i64,
    pub name: String,
}

/// A city joined with its county and state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub county: County,
    pub state: State,
}

impl City {
    /// Fully qualified name used to identify the city in reports,
    /// e.g. `"42-Rasht-Rasht-Gilan"`.
    pub fn long_name(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.id, self.name, self.county.name, self.state.name
        )
    }

    /// Text of a data-error report for this city's lines.
    pub fn report_template(&self) -> String {
        format!(
            "Line data for {} looks wrong.\nPlease describe the problem (line code, origin, destination, fare):\n",
            self.long_name()
        )
    }
}
