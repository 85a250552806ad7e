/// Width of an owner identifier (an ethereum style address)
pub const OWNER_WIDTH: usize = 20;

/// Number of fields in the transfer relation's input signature
pub const TRANSFER_FIELDS: usize = TRANSFER_PUBLIC_INPUTS + TRANSFER_PRIVATE_INPUTS;

/// Two hash halves for each of the three notes
pub const TRANSFER_PUBLIC_INPUTS: usize = 6;

/// Four opening fields for the spent and recipient notes, two for the change note (its owner
/// fields are shared with the spent note)
pub const TRANSFER_PRIVATE_INPUTS: usize = 10;

/// Name the transfer relation is registered under
pub const TRANSFER_RELATION: &str = "transfer";
