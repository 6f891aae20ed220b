/// Steps of one bootstrap run, in the only order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Download the payload from the resolved locator.
    Fetch,
    /// Append the preset argument if the preset artifact exists.
    Augment,
    /// Query the current privilege level.
    ElevateCheck,
    /// Start a new elevated process and return without waiting.
    ElevatedRelaunch,
    /// Run the payload here, with the privilege already held.
    InlineExecute,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Augment => "augment",
            Stage::ElevateCheck => "elevate-check",
            Stage::ElevatedRelaunch => "elevated-relaunch",
            Stage::InlineExecute => "inline-execute",
        }
    }
}
