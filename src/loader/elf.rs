//! ELF loading for little-endian MIPS32 executables.

use goblin::elf::program_header::PT_LOAD;
use goblin::elf::Elf;

use crate::error::{AccessType, MemoryFault};
use crate::loader::{LoadError, LoadedProgram};
use crate::vm::Memory;

/// Symbol holding the initial global pointer in MIPS toolchains.
const GP_SYMBOL: &str = "_gp";

/// Load an ELF image into `memory`.
///
/// Every `PT_LOAD` segment is copied to its virtual address; bytes between
/// `p_filesz` and `p_memsz` are zero-filled. The returned entry point comes
/// from the ELF header and `stack_top` becomes the initial `$sp`.
///
/// # Errors
///
/// Returns an error if the ELF is invalid, not 32-bit little-endian MIPS, or
/// a segment does not fit in mapped memory.
pub fn load_elf(
    memory: &mut Memory,
    elf_bytes: &[u8],
    stack_top: Option<u32>,
) -> Result<LoadedProgram, LoadError> {
    let elf = Elf::parse(elf_bytes).map_err(|e| LoadError::Segment {
        reason: format!("failed to parse ELF: {e}"),
    })?;

    validate_elf_header(&elf)?;

    let mut end = 0u32;
    for phdr in &elf.program_headers {
        if phdr.p_type == PT_LOAD && phdr.p_memsz > 0 {
            end = end.max(load_segment(memory, elf_bytes, phdr)?);
        }
    }

    let entry = u32::try_from(elf.entry).map_err(|_| LoadError::Segment {
        reason: format!("entry point {:#x} doesn't fit in u32", elf.entry),
    })?;

    Ok(LoadedProgram {
        entry,
        end,
        stack_pointer: stack_top,
        global_pointer: find_global_pointer(&elf),
    })
}

/// Validate the ELF header for 32-bit little-endian MIPS.
fn validate_elf_header(elf: &Elf) -> Result<(), LoadError> {
    if elf.header.e_machine != goblin::elf::header::EM_MIPS {
        return Err(LoadError::NotMips(format!(
            "expected MIPS ELF (machine {}), got machine type {}",
            goblin::elf::header::EM_MIPS,
            elf.header.e_machine
        )));
    }

    if elf.is_64 {
        return Err(LoadError::NotMips("expected 32-bit ELF, got 64-bit".to_string()));
    }

    if !elf.little_endian {
        return Err(LoadError::NotMips(
            "expected little-endian ELF (simulated memory is little-endian)".to_string(),
        ));
    }

    Ok(())
}

/// Copy one segment into memory and return its end address.
///
/// The target range is checked against mapped memory before the segment
/// image is allocated.
fn load_segment(
    memory: &mut Memory,
    elf_bytes: &[u8],
    phdr: &goblin::elf::ProgramHeader,
) -> Result<u32, LoadError> {
    let vaddr = u32::try_from(phdr.p_vaddr).map_err(|_| LoadError::Segment {
        reason: format!("segment vaddr {:#x} doesn't fit in u32", phdr.p_vaddr),
    })?;

    let filesz = usize::try_from(phdr.p_filesz).map_err(|_| LoadError::Segment {
        reason: format!("segment filesz {} too large", phdr.p_filesz),
    })?;

    let memsz = u32::try_from(phdr.p_memsz).map_err(|_| LoadError::Segment {
        reason: format!("segment memsz {:#x} doesn't fit in u32", phdr.p_memsz),
    })?;

    let end = vaddr.checked_add(memsz).ok_or_else(|| LoadError::Segment {
        reason: format!("segment at {vaddr:#x} with memsz {memsz:#x} overflows the address space"),
    })?;

    if !memory.is_mapped(vaddr, memsz) {
        return Err(LoadError::Fault(MemoryFault {
            addr: vaddr,
            access: AccessType::Write,
        }));
    }
    let memsz = usize::try_from(memsz).map_err(|_| LoadError::Segment {
        reason: format!("segment memsz {memsz} too large"),
    })?;

    let offset = usize::try_from(phdr.p_offset).map_err(|_| LoadError::Segment {
        reason: format!("segment offset {} too large", phdr.p_offset),
    })?;

    if filesz > memsz {
        return Err(LoadError::Segment {
            reason: format!("segment at {vaddr:#x} has filesz {filesz} > memsz {memsz}"),
        });
    }

    let data = offset
        .checked_add(filesz)
        .and_then(|end| elf_bytes.get(offset..end))
        .ok_or_else(|| LoadError::Segment {
            reason: format!(
                "segment file data at offset {offset} size {filesz} exceeds ELF size {}",
                elf_bytes.len()
            ),
        })?;

    // Zero-fill the whole memory image first so BSS is cleared even when
    // loading over a previous program.
    let mut image = vec![0u8; memsz];
    image[..filesz].copy_from_slice(data);
    memory.store_bytes(vaddr, &image).map_err(LoadError::Fault)?;

    Ok(end)
}

/// Find the global pointer symbol value if present.
fn find_global_pointer(elf: &Elf) -> Option<u32> {
    elf.syms
        .iter()
        .find(|sym| elf.strtab.get_at(sym.st_name) == Some(GP_SYMBOL))
        .and_then(|sym| u32::try_from(sym.st_value).ok())
}
