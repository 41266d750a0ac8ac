//! Control-flow facts about a single instruction, for host integration.

use log::warn;
use serde::Serialize;

use crate::dalvik::dex::{DexFile, FileOffset};
use crate::dalvik::insns::{endian_swap_shorts, parse_with_format, sign, InsnDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BranchKind {
    UnconditionalBranch,
    FunctionReturn,
    CallDestination,
    TrueBranch,
    FalseBranch,
    UnresolvedBranch,
    ExceptionBranch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchInfo {
    pub kind: BranchKind,
    /// Absolute file offset of the destination, where one is known.
    pub target: Option<u64>,
}

/// Length and outgoing branches of one instruction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstructionInfo {
    pub length: usize,
    pub branches: Vec<BranchInfo>,
}

impl InstructionInfo {
    fn branch(&mut self, kind: BranchKind) {
        self.branches.push(BranchInfo { kind, target: None });
    }

    fn branch_to(&mut self, kind: BranchKind, target: u64) {
        self.branches.push(BranchInfo {
            kind,
            target: Some(target),
        });
    }
}

impl DexFile {
    /// Summarize the instruction at `addr`. Branch targets are byte offsets
    /// computed as `addr + signed_operand * 2`; fall-throughs as
    /// `addr + length`.
    pub fn instruction_info(&self, data: &[u8], addr: FileOffset) -> InstructionInfo {
        let mut info = InstructionInfo::default();
        if data.len() < 2 {
            warn!(
                "instruction info requested for {} byte(s) at {addr:#x}",
                data.len()
            );
            return info;
        }

        // Payloads terminate linear sweeps; they are not themselves
        // reachable control flow.
        if data[0] == 0 && data[1] != 0 {
            if data[1] > 3 {
                info.length = 2;
                return info;
            }
            match self.pseudo_insn_at(addr) {
                Some(payload) => {
                    info.length = payload.total_size();
                    info.branch(BranchKind::FunctionReturn);
                }
                None => {
                    warn!("no payload known at {addr:#x}; host is out of sync");
                    info.length = 2;
                }
            }
            return info;
        }

        let insn = InsnDescriptor::of(data[0]);
        let fmt = insn.fmt();
        info.length = insn.size_in_bytes();
        if data.len() < info.length {
            warn!(
                "instruction {} at {addr:#x} needs {} bytes, {} available",
                insn.mnemonic,
                info.length,
                data.len()
            );
            return info;
        }

        let length = info.length;
        let operand = |letter: char| -> i64 {
            let swapped = endian_swap_shorts(&data[..length]);
            let args = parse_with_format(&swapped, fmt.pattern);
            let width = fmt.pattern.matches(letter).count() as u32;
            sign(args.get(&letter).copied().unwrap_or(0), width)
        };
        let relative = |offset: i64| (addr as i64 + offset * 2) as u64;
        let fall_through = addr as u64 + length as u64;

        let mnemonic = insn.mnemonic;
        if mnemonic.starts_with("return") {
            info.branch(BranchKind::FunctionReturn);
        } else if mnemonic == "throw" {
            info.branch(BranchKind::ExceptionBranch);
        } else if mnemonic.starts_with("goto") {
            info.branch_to(BranchKind::UnconditionalBranch, relative(operand('A')));
        } else if mnemonic == "packed-switch" || mnemonic == "sparse-switch" {
            // Full fan-out is left to a later lifting stage.
            info.branch(BranchKind::UnresolvedBranch);
        } else if mnemonic == "fill-array-data" {
            info.branch_to(BranchKind::TrueBranch, relative(operand('B')));
            info.branch_to(BranchKind::FalseBranch, fall_through);
        } else if mnemonic.starts_with("if-") {
            let letter = if fmt.pattern.contains('C') { 'C' } else { 'B' };
            info.branch_to(BranchKind::TrueBranch, relative(operand(letter)));
            info.branch_to(BranchKind::FalseBranch, fall_through);
        } else if mnemonic.starts_with("invoke-custom") {
            warn!("resolution of invoke-custom is not implemented");
            info.branch(BranchKind::UnresolvedBranch);
        } else if mnemonic.starts_with("invoke-") {
            let swapped = endian_swap_shorts(&data[..length]);
            let args = parse_with_format(&swapped, fmt.pattern);
            if let Some(&method_idx) = args.get(&'B') {
                if let Some(off) = self.method_insns_off(method_idx as u32) {
                    info.branch_to(BranchKind::CallDestination, off as u64);
                }
            }
        }

        info
    }
}
