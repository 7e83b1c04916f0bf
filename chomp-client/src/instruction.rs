//! Wire instructions for the Chomping Glass program.
//!
//! The program takes a single command byte per transaction. A move packs
//! 1-indexed row and column into the high and low nibble; the zero byte is
//! the reserved forfeit command.

use {
    crate::error::ChompError,
    solana_program::{
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_program,
    },
};

/// The deployed Chomping Glass program.
pub mod program {
    solana_program::declare_id!("63YfDxA8eAD4J3jPMXgpkjRXrycMJo14vTwwMRTEo2aP");
}

/// Fixed fee-collection account, writable in every game transaction.
pub mod fee_collector {
    solana_program::declare_id!("CyiBDtLBSdgyJ3itiKPbVajnFkNgPa8YeR86XPr9dJB4");
}

/// Per-wallet game account, derived from the player's key alone.
pub fn game_address(player: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[player.as_ref()], &program::id()).0
}

/// A single command accepted by the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    /// Eat the cell at (row, col), 0-indexed, plus everything above-left.
    Move { row: u8, col: u8 },
    /// Abandon the current game.
    Forfeit,
}

impl GameCommand {
    /// Encode to the single-byte wire form. Callers are responsible for
    /// keeping row in [0,4] and col in [0,7] before the 1-indexed packing.
    pub fn to_byte(self) -> u8 {
        match self {
            GameCommand::Move { row, col } => ((row + 1) << 4) | (col + 1),
            GameCommand::Forfeit => 0,
        }
    }

    /// Decode a command byte read back out of a confirmed transaction.
    /// Unlike `to_byte`, this consumes untrusted data and validates.
    pub fn from_byte(byte: u8) -> Result<GameCommand, ChompError> {
        if byte == 0 {
            return Ok(GameCommand::Forfeit);
        }
        let row = (byte >> 4).wrapping_sub(1);
        let col = (byte & 0x0f).wrapping_sub(1);
        if byte >> 4 == 0 || byte & 0x0f == 0 || row >= 5 || col >= 8 {
            return Err(ChompError::MalformedCommand(byte));
        }
        Ok(GameCommand::Move { row, col })
    }
}

/// Build the transaction instruction for a command.
///
/// Account order is fixed by the program: system program, the player
/// (signer, writable), the player's game account (writable), and the fee
/// collector (writable).
pub fn build_instruction(player: &Pubkey, command: GameCommand) -> Instruction {
    Instruction {
        program_id: program::id(),
        accounts: vec![
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new(*player, true),
            AccountMeta::new(game_address(player), false),
            AccountMeta::new(fee_collector::id(), false),
        ],
        data: vec![command.to_byte()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_byte_packs_one_indexed_nibbles() {
        assert_eq!(GameCommand::Move { row: 0, col: 0 }.to_byte(), 0x11);
        assert_eq!(GameCommand::Move { row: 4, col: 6 }.to_byte(), 0x57);
        assert_eq!(GameCommand::Move { row: 1, col: 4 }.to_byte(), 0x25);
        assert_eq!(GameCommand::Forfeit.to_byte(), 0);
    }

    #[test]
    fn command_byte_round_trip() {
        for row in 0..5u8 {
            for col in 0..8u8 {
                let cmd = GameCommand::Move { row, col };
                assert_eq!(GameCommand::from_byte(cmd.to_byte()).unwrap(), cmd);
            }
        }
        assert_eq!(
            GameCommand::from_byte(0).unwrap(),
            GameCommand::Forfeit
        );
    }

    #[test]
    fn from_byte_rejects_out_of_range_nibbles() {
        // zero row or column nibble
        assert!(GameCommand::from_byte(0x05).is_err());
        assert!(GameCommand::from_byte(0x50).is_err());
        // row 6, column 9
        assert!(GameCommand::from_byte(0x61).is_err());
        assert!(GameCommand::from_byte(0x19).is_err());
        assert!(GameCommand::from_byte(0xff).is_err());
    }

    #[test]
    fn instruction_account_order_and_payload() {
        let player = Pubkey::new_unique();
        let ix = build_instruction(&player, GameCommand::Move { row: 2, col: 3 });

        assert_eq!(ix.program_id, program::id());
        assert_eq!(ix.data, vec![0x34]);
        assert_eq!(ix.accounts.len(), 4);

        assert_eq!(ix.accounts[0].pubkey, system_program::id());
        assert!(!ix.accounts[0].is_signer);
        assert!(!ix.accounts[0].is_writable);

        assert_eq!(ix.accounts[1].pubkey, player);
        assert!(ix.accounts[1].is_signer);
        assert!(ix.accounts[1].is_writable);

        assert_eq!(ix.accounts[2].pubkey, game_address(&player));
        assert!(!ix.accounts[2].is_signer);
        assert!(ix.accounts[2].is_writable);

        assert_eq!(ix.accounts[3].pubkey, fee_collector::id());
        assert!(!ix.accounts[3].is_signer);
        assert!(ix.accounts[3].is_writable);
    }

    #[test]
    fn game_address_is_per_player() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        assert_eq!(game_address(&a), game_address(&a));
        assert_ne!(game_address(&a), game_address(&b));
    }
}
