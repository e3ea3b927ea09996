//! Hex text programs: one 32-bit word per token, loaded sequentially.

use crate::loader::{LoadError, LoadedProgram};
use crate::vm::Memory;

/// Parse whitespace-separated hex words. `#` starts a comment running to the
/// end of the line; an optional `0x`/`0X` prefix is accepted.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] for the first token that is not a 32-bit hex
/// number, or [`LoadError::Empty`] if there are no words.
pub fn parse_hex(text: &str) -> Result<Vec<u32>, LoadError> {
    let mut words = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let code = line.split('#').next().unwrap_or_default();
        for token in code.split_whitespace() {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            let word = u32::from_str_radix(digits, 16).map_err(|_| LoadError::Parse {
                line: index + 1,
                token: token.to_string(),
            })?;
            words.push(word);
        }
    }
    if words.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(words)
}

/// Parse `text` and store its words starting at `addr`.
///
/// # Errors
///
/// Returns a parse error, or [`LoadError::Fault`] if the program does not fit
/// in mapped memory.
pub fn load_hex(memory: &mut Memory, text: &str, addr: u32) -> Result<LoadedProgram, LoadError> {
    let words = parse_hex(text)?;
    let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_le_bytes()).collect();
    memory.store_bytes(addr, &bytes).map_err(LoadError::Fault)?;

    let len = u32::try_from(bytes.len()).map_err(|_| LoadError::Segment {
        reason: format!("{} words do not fit in the address space", words.len()),
    })?;
    Ok(LoadedProgram {
        entry: addr,
        end: addr.wrapping_add(len),
        stack_pointer: None,
        global_pointer: None,
    })
}
