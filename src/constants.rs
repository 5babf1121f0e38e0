/// Full protocol name, used as the root of the field tree
pub const PROTOCOL_NAME: &str = "Xbox Controller Protocol";
/// Short protocol name
pub const PROTOCOL_SHORT_NAME: &str = "Xbox";
/// Display filter prefix of every field
pub const PROTOCOL_FILTER_NAME: &str = "xbox";
/// Text of the protocol column
pub const PROTOCOL_COLUMN: &str = "XBOX";
/// Default text of the info column
pub const SUMMARY_INFO: &str = "XBOX action";
/// ATT handle the controller notifies input reports on
pub const BLE_HANDLE: u16 = 0x001E;
