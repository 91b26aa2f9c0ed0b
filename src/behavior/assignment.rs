use crate::behavior::options::BehaviorOptions;

/// Binds a behavior id to an element with instance options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BehaviorAssignment {
    pub behavior: String,
    #[serde(default)]
    pub options: BehaviorOptions,
    /// Exempt from the composition's visibility and rotation rules.
    #[serde(default)]
    pub pinned: bool,
}

impl BehaviorAssignment {
    pub fn new(behavior: impl Into<String>) -> Self {
        Self {
            behavior: behavior.into(),
            options: BehaviorOptions::new(),
            pinned: false,
        }
    }

    pub fn with_options(mut self, options: BehaviorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}
