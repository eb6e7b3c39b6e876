/// Static label for a well-known contract, seeded at startup and read by
/// the stats renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractLabel {
    pub address: String,
    pub name: String,
    pub category: String,
    pub protocol: String,
}

impl ContractLabel {
    pub fn new(address: &str, name: &str, category: &str, protocol: &str) -> Self {
        Self {
            address: address.to_lowercase(),
            name: name.to_string(),
            category: category.to_string(),
            protocol: protocol.to_string(),
        }
    }
}
