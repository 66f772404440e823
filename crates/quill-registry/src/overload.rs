//! Overload families and positional-suffix decoding.
//!
//! A family of same-named candidate routines is distinguished by a
//! positional suffix on each candidate's declared name: `Cast__0`,
//! `Cast__1`, ... `Cast__a`. The suffix encodes a base-36 digit (`0`-`9`,
//! then `a`-`z` for 10-35). Decoding happens exactly once, at
//! registration, and is validated eagerly: an out-of-range index or a
//! duplicate index fails the family's construction, not its first use.

use quill_core::{RegistrationError, Routine, Type};

/// Decode the positional suffix of a candidate name.
///
/// Returns the base name and the decoded index, or `None` when the name
/// carries no `__<digit>` suffix.
pub fn decode_index(name: &str) -> Option<(&str, usize)> {
    let n = name.len();
    if n < 4 || !name.is_char_boundary(n - 3) {
        return None;
    }
    if &name[n - 3..n - 1] != "__" {
        return None;
    }
    let idx = match name.as_bytes()[n - 1] {
        c @ b'0'..=b'9' => (c - b'0') as usize,
        c @ b'a'..=b'z' => (c - b'a') as usize + 10,
        _ => return None,
    };
    Some((&name[..n - 3], idx))
}

/// One callable symbol backed by several candidate routines, selected by
/// explicit index or by argument shape. Built once at environment
/// bootstrap, read-only thereafter.
#[derive(Debug, Clone)]
pub struct OverloadSet {
    name: String,
    candidates: Vec<Routine>,
}

impl OverloadSet {
    /// Build a family from candidates carrying positional suffixes.
    ///
    /// The candidate stored at position `k` is the one whose suffix
    /// decodes to `k`; members may arrive in any order.
    pub fn register(name: &str, members: Vec<Routine>) -> Result<Self, RegistrationError> {
        let count = members.len();
        let mut slots: Vec<Option<Routine>> = vec![None; count];
        for member in members {
            let (_, idx) = decode_index(&member.name).ok_or_else(|| {
                RegistrationError::InvalidSuffix {
                    name: member.name.clone(),
                }
            })?;
            if idx >= count {
                return Err(RegistrationError::IndexOutOfRange {
                    name: member.name.clone(),
                    index: idx,
                    count,
                });
            }
            if slots[idx].is_some() {
                return Err(RegistrationError::DuplicateIndex {
                    name: name.to_string(),
                    index: idx,
                });
            }
            slots[idx] = Some(member);
        }
        // count members, all indices < count and distinct: every slot is
        // filled.
        let candidates = slots.into_iter().flatten().collect();
        Ok(OverloadSet {
            name: name.to_string(),
            candidates,
        })
    }

    /// The family's base name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All candidates, in index order.
    pub fn candidates(&self) -> &[Routine] {
        &self.candidates
    }

    /// Direct candidate selection by explicit index.
    pub fn resolve_at(&self, index: usize) -> Result<&Routine, RegistrationError> {
        self.candidates
            .get(index)
            .ok_or_else(|| RegistrationError::IndexOutOfRange {
                name: self.name.clone(),
                index,
                count: self.candidates.len(),
            })
    }

    /// Select the first candidate, in index order, whose signature matches
    /// the call's argument count and types.
    pub fn resolve(&self, args: &[Type]) -> Result<&Routine, RegistrationError> {
        self.candidates
            .iter()
            .find(|c| signature_matches(c, args))
            .ok_or_else(|| RegistrationError::NoMatchingOverload {
                name: self.name.clone(),
                args: args
                    .iter()
                    .map(Type::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

fn signature_matches(candidate: &Routine, args: &[Type]) -> bool {
    candidate.sig.params.len() == args.len()
        && args
            .iter()
            .zip(candidate.sig.params.iter())
            .all(|(arg, param)| arg.assignable_to(param))
}
