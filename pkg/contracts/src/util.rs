use ethereum_types::{H256, U256};
use zk_primitives::{Commitment, Element};

pub fn convert_element_to_u256(element: &Element) -> U256 {
    U256::from_big_endian(&element.to_be_bytes())
}

pub fn convert_commitment_to_h256(commitment: &Commitment) -> H256 {
    H256(*commitment.inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_is_big_endian() {
        let element = Element::from(0x0102_u64);
        assert_eq!(convert_element_to_u256(&element), U256::from(0x0102));
    }

    #[test]
    fn commitment_keeps_its_bytes() {
        let mut bytes = [7; 32];
        bytes[0] = 1;

        assert_eq!(convert_commitment_to_h256(&Commitment(bytes)), H256(bytes));
    }
}
