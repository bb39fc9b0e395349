//! Transfer message structures

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, CellResult, MsgAddress};

/// Send mode flag: pay forward fees separately from the value.
pub const SEND_MODE_PAY_FEES_SEPARATELY: u8 = 1;

/// Send mode flag: ignore errors during the action phase.
pub const SEND_MODE_IGNORE_ERRORS: u8 = 2;

/// Bytes of comment text that fit in the first cell after the 32-bit op.
const FIRST_CHUNK: usize = 123;

/// Bytes of comment text in each continuation cell.
const TAIL_CHUNK: usize = 127;

/// A transfer to be sent from a wallet
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Destination address
    pub to: MsgAddress,
    /// Amount in nanotons
    pub amount: u128,
    /// Optional message payload
    pub payload: Option<Arc<Cell>>,
    /// Bounce flag
    pub bounce: bool,
    /// Send mode (default: pay fees separately)
    pub mode: u8,
}

impl Transfer {
    /// Create a simple transfer
    pub fn new(to: MsgAddress, amount: u128) -> Self {
        Self {
            to,
            amount,
            payload: None,
            bounce: true,
            mode: SEND_MODE_PAY_FEES_SEPARATELY,
        }
    }

    /// Set payload
    pub fn with_payload(mut self, payload: Cell) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    /// Attach a text comment as payload.
    pub fn with_comment(self, text: &str) -> CellResult<Self> {
        Ok(self.with_payload(build_comment(text)?))
    }

    /// Set bounce flag
    pub fn with_bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    /// Set send mode
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }
}

/// Build a text comment cell (`op = 0` followed by UTF-8 text).
///
/// Text that does not fit in one cell continues in a chain of references.
pub fn build_comment(text: &str) -> CellResult<Cell> {
    let bytes = text.as_bytes();
    let (head, rest) = bytes.split_at(bytes.len().min(FIRST_CHUNK));

    let mut tail: Option<Arc<Cell>> = None;
    for chunk in rest.chunks(TAIL_CHUNK).rev() {
        let mut builder = CellBuilder::new();
        builder.store_bytes(chunk)?;
        if let Some(next) = tail.take() {
            builder.store_ref(next)?;
        }
        tail = Some(Arc::new(builder.build()?));
    }

    let mut builder = CellBuilder::new();
    builder.store_u32(0)?;
    builder.store_bytes(head)?;
    if let Some(next) = tail {
        builder.store_ref(next)?;
    }
    builder.build()
}
