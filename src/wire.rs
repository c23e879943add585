//! Serialized form of analyzed expression trees.
//!
//! A tree is flattened into its nodes in prefix order; each node records
//! how many children follow it. The node list is bincode-encoded inside a
//! frame: a tag byte, a big-endian i32 length that counts itself, and the
//! body.

use crate::expression::{Expr, Selectivity};
use crate::types::{DataType, Value};
use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag byte opening an expression frame
pub const FRAME_TAG: u8 = b'X';

const LENGTH_SIZE: usize = 4;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("invalid frame tag: {0:#04x}")]
    InvalidTag(u8),

    #[error("invalid frame length: {0}")]
    InvalidLength(i32),

    #[error("frame body of {0} bytes does not fit the length field")]
    FrameTooLarge(usize),

    #[error("truncated frame: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, WireError>;

/// Kind of a serialized expression node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    NullLiteral,
    BoolLiteral,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    SlotRef,
    CastExpr,
    BinaryPred,
    InPred,
    IsNullPred,
    CompoundPred,
}

/// Node-specific data not carried by the generic fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodePayload {
    None,
    Literal(Value),
    Slot { slot_id: Option<u32>, label: String },
    InPred { negated: bool },
    IsNullPred { negated: bool },
}

/// One serialized expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    pub node_type: NodeType,
    pub data_type: DataType,
    pub num_children: u32,
    /// Name of the resolved function; carries the operator of predicates
    pub fn_name: Option<String>,
    pub fn_symbol: Option<String>,
    /// Estimate, or -1.0 if unknown
    pub selectivity: f64,
    pub payload: NodePayload,
}

impl WireNode {
    pub fn selectivity(&self) -> Selectivity {
        Selectivity::from_raw(self.selectivity)
    }
}

/// Flatten `expr` into prefix order
pub fn tree_to_wire(expr: &Expr) -> Vec<WireNode> {
    let mut nodes = Vec::new();
    append_nodes(expr, &mut nodes);
    nodes
}

fn append_nodes(expr: &Expr, nodes: &mut Vec<WireNode>) {
    let function = expr.function();
    nodes.push(WireNode {
        node_type: expr.node_type(),
        data_type: expr.data_type(),
        num_children: expr.children().len() as u32,
        fn_name: function.map(|f| f.name().to_string()),
        fn_symbol: function.map(|f| f.symbol().to_string()),
        selectivity: expr.selectivity().as_raw(),
        payload: payload(expr),
    });
    for child in expr.children() {
        append_nodes(child, nodes);
    }
}

fn payload(expr: &Expr) -> NodePayload {
    match expr {
        Expr::Literal(lit) => NodePayload::Literal(lit.value().clone()),
        Expr::SlotRef(slot) => NodePayload::Slot {
            slot_id: slot.slot_id().map(|id| id.0),
            label: slot.label().to_string(),
        },
        Expr::In(pred) => NodePayload::InPred {
            negated: pred.is_negated(),
        },
        Expr::IsNull(pred) => NodePayload::IsNullPred {
            negated: pred.is_negated(),
        },
        // Operator travels as the function name, operands as children
        Expr::Cast(_) | Expr::Binary(_) | Expr::Compound(_) => NodePayload::None,
    }
}

/// Value of the length field for a body of `body_len` bytes
fn frame_length(body_len: usize) -> Result<i32> {
    body_len
        .checked_add(LENGTH_SIZE)
        .and_then(|len| i32::try_from(len).ok())
        .ok_or(WireError::FrameTooLarge(body_len))
}

/// Append a frame holding `expr` to `buf`
pub fn encode(expr: &Expr, buf: &mut BytesMut) -> Result<()> {
    let body = bincode::serialize(&tree_to_wire(expr))?;
    let len = frame_length(body.len())?;
    buf.put_u8(FRAME_TAG);
    buf.put_i32(len);
    buf.put_slice(&body);
    Ok(())
}

/// Decode one frame from the start of `frame`
pub fn decode(frame: &[u8]) -> Result<Vec<WireNode>> {
    let mut buf = frame;
    if buf.remaining() < 1 + LENGTH_SIZE {
        return Err(WireError::Truncated {
            needed: 1 + LENGTH_SIZE,
            available: buf.remaining(),
        });
    }

    let tag = buf.get_u8();
    if tag != FRAME_TAG {
        return Err(WireError::InvalidTag(tag));
    }
    let len = buf.get_i32();
    if len < LENGTH_SIZE as i32 {
        return Err(WireError::InvalidLength(len));
    }
    let body_len = len as usize - LENGTH_SIZE;
    if buf.remaining() < body_len {
        return Err(WireError::Truncated {
            needed: body_len,
            available: buf.remaining(),
        });
    }
    Ok(bincode::deserialize(&buf[..body_len])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Analyzer, ColumnStats};
    use crate::catalog::FunctionCatalog;
    use std::sync::Arc;

    fn analyzed(mut expr: Expr) -> Expr {
        let mut analyzer = Analyzer::new(Arc::new(FunctionCatalog::with_builtins()));
        analyzer.register_column("id", DataType::Int, ColumnStats::with_ndv(2));
        analyzer.register_column("flag", DataType::Boolean, ColumnStats::default());
        analyzer.analyze(&mut expr).unwrap();
        expr
    }

    #[test]
    fn test_prefix_order() {
        let expr = analyzed(Expr::or(
            Expr::eq(Expr::column("id"), Expr::int(1)),
            Expr::not(Expr::column("flag")),
        ));
        let nodes = tree_to_wire(&expr);
        let types: Vec<NodeType> = nodes.iter().map(|n| n.node_type).collect();
        assert_eq!(
            types,
            vec![
                NodeType::CompoundPred,
                NodeType::BinaryPred,
                NodeType::SlotRef,
                NodeType::IntLiteral,
                NodeType::CompoundPred,
                NodeType::SlotRef,
            ]
        );

        let root = &nodes[0];
        assert_eq!(root.num_children, 2);
        assert_eq!(root.fn_name.as_deref(), Some("or"));
        assert_eq!(root.payload, NodePayload::None);
        assert_eq!(root.data_type, DataType::Boolean);
        assert_eq!(root.selectivity(), Selectivity::UNKNOWN);

        assert_eq!(nodes[1].fn_name.as_deref(), Some("eq"));
        assert_eq!(nodes[1].selectivity, 0.5);
        assert_eq!(nodes[4].fn_name.as_deref(), Some("not"));
        assert_eq!(nodes[4].num_children, 1);
        assert_eq!(
            nodes[5].payload,
            NodePayload::Slot {
                slot_id: Some(1),
                label: "flag".to_string()
            }
        );
    }

    #[test]
    fn test_frame() {
        let expr = analyzed(Expr::and(Expr::column("flag"), Expr::bool(true)));
        let mut buf = BytesMut::new();
        encode(&expr, &mut buf).unwrap();

        assert_eq!(buf[0], FRAME_TAG);
        let len = i32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]);
        assert_eq!(len as usize, buf.len() - 1);

        let nodes = decode(&buf).unwrap();
        assert_eq!(nodes, tree_to_wire(&expr));
    }

    #[test]
    fn test_frame_length_limit() {
        assert_eq!(frame_length(0).unwrap(), 4);
        assert_eq!(
            frame_length(i32::MAX as usize - 4).unwrap(),
            i32::MAX
        );
        assert!(matches!(
            frame_length(i32::MAX as usize - 3),
            Err(WireError::FrameTooLarge(_))
        ));
        assert!(matches!(
            frame_length(usize::MAX),
            Err(WireError::FrameTooLarge(n)) if n == usize::MAX
        ));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode(&[FRAME_TAG, 0, 0]),
            Err(WireError::Truncated { .. })
        ));
        assert!(matches!(
            decode(&[b'Q', 0, 0, 0, 4]),
            Err(WireError::InvalidTag(b'Q'))
        ));
        assert!(matches!(
            decode(&[FRAME_TAG, 0, 0, 0, 2]),
            Err(WireError::InvalidLength(2))
        ));
        assert!(matches!(
            decode(&[FRAME_TAG, 0, 0, 0, 40, 1, 2]),
            Err(WireError::Truncated {
                needed: 36,
                available: 2
            })
        ));
    }
}
