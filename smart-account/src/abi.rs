//! Minimal Solidity ABI encoding for the handful of calls the managers make.
//!
//! Only static words (`uint256` up to `u128`, `address`), one-level dynamic
//! arrays of them and `string` return values are supported.

use sha3::{Digest, Keccak256};
use thiserror::Error;
use vortex_common::address::{Address, ADDRESS_LEN};

pub const WORD: usize = 32;

pub const WRITE_DICE_ROLL: &str = "writeDiceRoll(uint256)";
pub const GET_ALL_ROLLS: &str = "getAllRolls(address)";
pub const ADD_GUARDIAN: &str = "addGuardian(address)";
pub const REMOVE_GUARDIAN: &str = "removeGuardian(address,address)";
pub const GET_GUARDIANS: &str = "getGuardians(address)";

pub const BALANCE_OF: &str = "balanceOf(address)";
pub const NAME: &str = "name()";
pub const SYMBOL: &str = "symbol()";
pub const DECIMALS: &str = "decimals()";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("abi data truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
    #[error("uint256 value does not fit in 128 bits")]
    Overflow,
    #[error("address word has non-zero padding")]
    DirtyAddress,
    #[error("abi offset or length out of range")]
    OutOfRange,
    #[error("abi offset {0} is not word aligned")]
    Misaligned(usize),
    #[error("abi string is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Uint(u128),
    Address(Address),
}

impl Token {
    fn word(&self) -> [u8; WORD] {
        let mut out = [0u8; WORD];
        match self {
            Token::Uint(v) => out[WORD - 16..].copy_from_slice(&v.to_be_bytes()),
            Token::Address(a) => out[WORD - ADDRESS_LEN..].copy_from_slice(&a.to_bytes()),
        }
        out
    }
}

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn selector_hex(signature: &str) -> String {
    format!("0x{}", hex::encode(selector(signature)))
}

/// `abi.encode` of static `args`.
pub fn encode_args(args: &[Token]) -> Vec<u8> {
    args.iter().flat_map(|arg| arg.word()).collect()
}

/// Calldata for `signature` applied to static `args`.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + args.len() * WORD);
    out.extend_from_slice(&selector(signature));
    out.extend_from_slice(&encode_args(args));
    out
}

/// Split calldata into its selector and argument words.
pub fn split_call(data: &[u8]) -> Result<([u8; 4], &[u8]), AbiError> {
    if data.len() < 4 {
        return Err(AbiError::Truncated {
            need: 4,
            have: data.len(),
        });
    }
    let (sel, args) = data.split_at(4);
    Ok(([sel[0], sel[1], sel[2], sel[3]], args))
}

fn word_at(data: &[u8], index: usize) -> Result<&[u8], AbiError> {
    let truncated = || AbiError::Truncated {
        need: index.saturating_add(1).saturating_mul(WORD),
        have: data.len(),
    };
    let start = index.checked_mul(WORD).ok_or_else(truncated)?;
    let end = start.checked_add(WORD).ok_or_else(truncated)?;
    data.get(start..end).ok_or_else(truncated)
}

pub fn uint_at(data: &[u8], index: usize) -> Result<u128, AbiError> {
    let word = word_at(data, index)?;
    if word[..WORD - 16].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow);
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&word[WORD - 16..]);
    Ok(u128::from_be_bytes(buf))
}

pub fn address_at(data: &[u8], index: usize) -> Result<Address, AbiError> {
    let word = word_at(data, index)?;
    if word[..WORD - ADDRESS_LEN].iter().any(|b| *b != 0) {
        return Err(AbiError::DirtyAddress);
    }
    let mut buf = [0u8; ADDRESS_LEN];
    buf.copy_from_slice(&word[WORD - ADDRESS_LEN..]);
    Ok(Address::from_bytes(buf))
}

// ─── Dynamic arrays ─────────────────────────────────────────────────────────

/// Return data of a function with a single array output.
pub fn encode_array(items: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity((items.len() + 2) * WORD);
    out.extend_from_slice(&Token::Uint(WORD as u128).word());
    out.extend_from_slice(&Token::Uint(items.len() as u128).word());
    for item in items {
        out.extend_from_slice(&item.word());
    }
    out
}

/// Word index of the length word and the length of the dynamic value whose
/// offset sits in word `head`.
fn dynamic_head(data: &[u8], head: usize) -> Result<(usize, usize), AbiError> {
    let offset = usize::try_from(uint_at(data, head)?).map_err(|_| AbiError::OutOfRange)?;
    if offset % WORD != 0 {
        return Err(AbiError::Misaligned(offset));
    }
    let len_index = offset / WORD;
    let len = usize::try_from(uint_at(data, len_index)?).map_err(|_| AbiError::OutOfRange)?;
    Ok((len_index, len))
}

/// Word index of the first element and the element count of the array whose
/// offset sits in word `head`.
fn array_bounds(data: &[u8], head: usize) -> Result<(usize, usize), AbiError> {
    let (len_index, len) = dynamic_head(data, head)?;
    // The last element must exist, so `len_index + 1 + len` cannot overflow below.
    word_at(data, len_index.checked_add(len).ok_or(AbiError::OutOfRange)?)?;
    Ok((len_index + 1, len))
}

pub fn decode_address_array(data: &[u8]) -> Result<Vec<Address>, AbiError> {
    let (first, len) = array_bounds(data, 0)?;
    (first..first + len).map(|i| address_at(data, i)).collect()
}

pub fn decode_uint_array(data: &[u8]) -> Result<Vec<u128>, AbiError> {
    let (first, len) = array_bounds(data, 0)?;
    (first..first + len).map(|i| uint_at(data, i)).collect()
}

/// Return data of a function with a single static output.
pub fn encode_uint(value: u128) -> Vec<u8> {
    Token::Uint(value).word().to_vec()
}

/// Return data of a function with a single `string` output.
pub fn encode_string(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(2 * WORD + padded);
    out.extend_from_slice(&Token::Uint(WORD as u128).word());
    out.extend_from_slice(&Token::Uint(bytes.len() as u128).word());
    out.extend_from_slice(bytes);
    out.resize(2 * WORD + padded, 0);
    out
}

pub fn decode_string(data: &[u8]) -> Result<String, AbiError> {
    let (len_index, len) = dynamic_head(data, 0)?;
    // The length word was read, so its end is within `data`.
    let start = (len_index + 1) * WORD;
    let end = start.checked_add(len).ok_or(AbiError::OutOfRange)?;
    let bytes = data.get(start..end).ok_or(AbiError::Truncated {
        need: end,
        have: data.len(),
    })?;
    String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

// ─── Addresses ──────────────────────────────────────────────────────────────

/// EIP-1014: `keccak256(0xff ++ deployer ++ salt ++ init_code_hash)[12..]`.
pub fn create2_address(
    deployer: &Address,
    salt: [u8; WORD],
    init_code_hash: [u8; WORD],
) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update([0xffu8]);
    hasher.update(deployer.to_bytes());
    hasher.update(salt);
    hasher.update(init_code_hash);
    let hash = hasher.finalize();
    let mut raw = [0u8; ADDRESS_LEN];
    raw.copy_from_slice(&hash[WORD - ADDRESS_LEN..]);
    Address::from_bytes(raw)
}

// ─── Social recovery ────────────────────────────────────────────────────────

/// `abi.encode(uint256 threshold, address[] guardians)`, the validator's
/// install data.
pub fn encode_recovery_init(threshold: u8, guardians: &[Address]) -> Vec<u8> {
    let mut out = Vec::with_capacity((guardians.len() + 3) * WORD);
    out.extend_from_slice(&Token::Uint(threshold as u128).word());
    out.extend_from_slice(&Token::Uint(2 * WORD as u128).word());
    out.extend_from_slice(&Token::Uint(guardians.len() as u128).word());
    for guardian in guardians {
        out.extend_from_slice(&Token::Address(guardian.clone()).word());
    }
    out
}

pub fn decode_recovery_init(data: &[u8]) -> Result<(u128, Vec<Address>), AbiError> {
    let threshold = uint_at(data, 0)?;
    let (first, len) = array_bounds(data, 1)?;
    let guardians = (first..first + len)
        .map(|i| address_at(data, i))
        .collect::<Result<_, _>>()?;
    Ok((threshold, guardians))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> Address {
        let mut raw = [0u8; ADDRESS_LEN];
        raw[ADDRESS_LEN - 1] = last;
        Address::from_bytes(raw)
    }

    #[test]
    fn test_known_selector() {
        assert_eq!(selector_hex("transfer(address,uint256)"), "0xa9059cbb");
        assert_eq!(selector_hex("balanceOf(address)"), "0x70a08231");
    }

    #[test]
    fn test_dice_roll_calldata() {
        let data = encode_call(WRITE_DICE_ROLL, &[Token::Uint(5)]);
        assert_eq!(data.len(), 4 + WORD);
        let (sel, args) = split_call(&data).unwrap();
        assert_eq!(sel, selector(WRITE_DICE_ROLL));
        assert_eq!(uint_at(args, 0).unwrap(), 5);
        assert_eq!(data[4 + WORD - 1], 5);
    }

    #[test]
    fn test_remove_guardian_argument_order() {
        let data = encode_call(
            REMOVE_GUARDIAN,
            &[Token::Address(addr(1)), Token::Address(addr(9))],
        );
        let (_, args) = split_call(&data).unwrap();
        assert_eq!(address_at(args, 0).unwrap(), addr(1));
        assert_eq!(address_at(args, 1).unwrap(), addr(9));
    }

    #[test]
    fn test_array_return_data() {
        let rolls = encode_array(&[Token::Uint(3), Token::Uint(6)]);
        assert_eq!(decode_uint_array(&rolls).unwrap(), vec![3, 6]);
        assert!(decode_uint_array(&encode_array(&[])).unwrap().is_empty());

        let guardians = encode_array(&[Token::Address(addr(7))]);
        assert_eq!(decode_address_array(&guardians).unwrap(), vec![addr(7)]);
    }

    #[test]
    fn test_truncated_array_rejected() {
        let mut data = encode_array(&[Token::Uint(1), Token::Uint(2)]);
        data.truncate(data.len() - 1);
        assert!(matches!(
            decode_uint_array(&data),
            Err(AbiError::Truncated { .. })
        ));
        assert!(split_call(&[0xde, 0xad]).is_err());
    }

    #[test]
    fn test_recovery_init_data() {
        let data = encode_recovery_init(1, &[addr(2), addr(3)]);
        let (threshold, guardians) = decode_recovery_init(&data).unwrap();
        assert_eq!(threshold, 1);
        assert_eq!(guardians, vec![addr(2), addr(3)]);
    }

    fn offset_word(offset: u128) -> Vec<u8> {
        Token::Uint(offset).word().to_vec()
    }

    #[test]
    fn test_hostile_offsets_rejected() {
        // Word index whose end position wraps usize.
        let data = offset_word(0xFFFF_FFFF_FFFF_FFE0);
        assert!(matches!(
            decode_uint_array(&data),
            Err(AbiError::Truncated { .. } | AbiError::OutOfRange)
        ));

        // 2^64 + 32 must not be truncated to 32.
        let mut data = offset_word((1u128 << 64) + 32);
        data.extend_from_slice(&offset_word(0));
        assert_eq!(decode_uint_array(&data), Err(AbiError::OutOfRange));

        let mut data = offset_word(33);
        data.extend_from_slice(&[0u8; 2 * WORD]);
        assert_eq!(decode_address_array(&data), Err(AbiError::Misaligned(33)));
    }

    #[test]
    fn test_huge_length_rejected() {
        let mut data = offset_word(WORD as u128);
        data.extend_from_slice(&offset_word(u64::MAX as u128));
        assert_eq!(decode_uint_array(&data), Err(AbiError::OutOfRange));
    }

    #[test]
    fn test_string_return_data() {
        let data = encode_string("Vortex USD");
        assert_eq!(data.len(), 3 * WORD);
        assert_eq!(decode_string(&data).unwrap(), "Vortex USD");
        assert_eq!(decode_string(&encode_string("")).unwrap(), "");

        let long = "x".repeat(WORD + 1);
        assert_eq!(encode_string(&long).len(), 4 * WORD);
        assert_eq!(decode_string(&encode_string(&long)).unwrap(), long);
    }

    #[test]
    fn test_string_length_past_end_rejected() {
        let mut data = offset_word(WORD as u128);
        data.extend_from_slice(&offset_word(5));
        data.extend_from_slice(b"abc");
        assert_eq!(
            decode_string(&data),
            Err(AbiError::Truncated {
                need: 2 * WORD + 5,
                have: 2 * WORD + 3
            })
        );

        let mut data = offset_word(WORD as u128);
        data.extend_from_slice(&offset_word(2));
        data.extend_from_slice(&[0xff, 0xfe]);
        assert_eq!(decode_string(&data), Err(AbiError::InvalidUtf8));
    }

    #[test]
    fn test_create2_reference_vector() {
        let mut init_code_hash = [0u8; WORD];
        init_code_hash.copy_from_slice(&Keccak256::digest([0x00u8]));
        let predicted = create2_address(&Address::zero(), [0u8; WORD], init_code_hash);
        let expected: Address = "0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38".parse().unwrap();
        assert_eq!(predicted, expected);
    }

    #[test]
    fn test_oversized_uint_rejected() {
        let mut word = [0u8; WORD];
        word[0] = 1;
        assert_eq!(uint_at(&word, 0), Err(AbiError::Overflow));
        assert_eq!(address_at(&word, 0), Err(AbiError::DirtyAddress));
    }
}
