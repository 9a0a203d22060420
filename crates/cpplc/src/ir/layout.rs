//! Target data layout: sizes, alignments and struct field offsets.
//!
//! The layout string fixes the pointer width and gives every scalar its
//! natural alignment, so struct layouts follow the C rules on both widths.

use inkwell::targets::TargetData;
use inkwell::types::StructType;

/// Data layout string for a target with the given pointer width.
pub fn data_layout(pointer_width: u32) -> String {
    format!(
        "e-m:e-p:{w}:{w}-i1:8-i8:8-i16:16-i32:32-i64:64-f16:16-f32:32-f64:64-n8:16:32:64-S128",
        w = pointer_width
    )
}

/// Field offsets of a struct, all in bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructLayout {
    pub size: u64,
    pub align: u64,
    pub offsets: Vec<u64>,
}

impl StructLayout {
    /// Reads the layout LLVM computes for a struct with a body.
    pub fn of(target: &TargetData, ty: &StructType<'_>) -> Self {
        let offsets = (0..ty.count_fields())
            .map(|idx| target.offset_of_element(ty, idx).unwrap_or(0))
            .collect();
        StructLayout {
            size: target.get_abi_size(ty),
            align: target.get_abi_alignment(ty) as u64,
            offsets,
        }
    }
}
