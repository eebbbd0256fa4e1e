/// A person affiliated with a company through one or more relationship roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub nationality: String,

    /// Relationship label; repeated roles are joined with ` \ `
    pub relationship: String,

    /// Zero means "not applicable / not stated"
    pub stock: u64,
    pub quota: u64,
    pub ratio: u64,
}
