//! Commit hashes

use crate::error::NameResult;
use crate::name::Fname;
use idreg_core::{hasher, Address, Hash32};

/// Validate `name` and hash it with the reveal inputs
pub fn generate_commit(
    name: &str,
    to: &Address,
    secret: &[u8; 32],
    recovery: &Address,
) -> NameResult<Hash32> {
    Ok(commit_hash(&Fname::parse(name)?, to, secret, recovery))
}

/// Commit hash of an already validated name
pub fn commit_hash(name: &Fname, to: &Address, secret: &[u8; 32], recovery: &Address) -> Hash32 {
    let mut h = hasher();
    h.update(name.packed())
        .update(to.as_bytes())
        .update(secret)
        .update(recovery.as_bytes());
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NameError;

    #[test]
    fn every_input_changes_the_commit() {
        let to = Address::repeat_byte(1);
        let recovery = Address::repeat_byte(2);
        let base = generate_commit("alice", &to, &[7; 32], &recovery).unwrap();
        assert_eq!(base, generate_commit("alice", &to, &[7; 32], &recovery).unwrap());
        assert_ne!(base, generate_commit("alicf", &to, &[7; 32], &recovery).unwrap());
        assert_ne!(base, generate_commit("alice", &recovery, &[7; 32], &recovery).unwrap());
        assert_ne!(base, generate_commit("alice", &to, &[8; 32], &recovery).unwrap());
        assert_ne!(base, generate_commit("alice", &to, &[7; 32], &to).unwrap());
    }

    #[test]
    fn invalid_name_has_no_commit() {
        let to = Address::repeat_byte(1);
        assert_eq!(
            generate_commit("-alice", &to, &[0; 32], &Address::ZERO),
            Err(NameError::InvalidName)
        );
    }
}
