//! Flexible-content block validation and sanitization.
//!
//! A block is a JSON object carrying a layout tag under [`LAYOUT_TAG`] that
//! identifies which content-block template it represents. Blocks missing the
//! tag are dropped individually with a diagnostic; one bad block never fails
//! the batch.

use std::str::FromStr;

use anyhow::bail;
use serde_json::{Map, Value};
use tracing::warn;

use super::filter::sanitize_plain_text;
use super::value::sanitize_json;

/// Reserved block key identifying the layout template.
pub const LAYOUT_TAG: &str = "acf_fc_layout";

/// Sanitization depth applied to block content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSanitization {
    /// Recursively sanitize every scalar text value in the block.
    #[default]
    Recursive,
    /// Pass block content through unchanged. The layout tag is still
    /// required and still plain-text sanitized.
    Passthrough,
}

impl FromStr for BlockSanitization {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "recursive" => Ok(Self::Recursive),
            "passthrough" => Ok(Self::Passthrough),
            other => {
                bail!("BLOCK_SANITIZATION must be 'recursive' or 'passthrough', got '{other}'")
            }
        }
    }
}

/// Validate and sanitize an ordered sequence of blocks.
///
/// Order is preserved. Blocks that are not objects or lack a string layout
/// tag are dropped and logged. Remaining content is sanitized per `policy`.
pub fn sanitize_blocks(blocks: &[Value], policy: BlockSanitization) -> Vec<Value> {
    blocks
        .iter()
        .filter_map(|block| sanitize_block(block, policy))
        .collect()
}

fn sanitize_block(block: &Value, policy: BlockSanitization) -> Option<Value> {
    let Some(entries) = block.as_object() else {
        warn!(block = %block, "content block is not an object, dropping");
        return None;
    };

    let Some(layout) = entries.get(LAYOUT_TAG).and_then(Value::as_str) else {
        warn!(block = %block, "content block missing layout tag, dropping");
        return None;
    };

    let mut sanitized = Map::new();
    sanitized.insert(
        LAYOUT_TAG.to_string(),
        Value::String(sanitize_plain_text(layout)),
    );

    for (key, value) in entries {
        if key == LAYOUT_TAG {
            continue;
        }
        match policy {
            BlockSanitization::Recursive => {
                // Unsupported values sanitize to None and are omitted
                if let Some(clean) = sanitize_json(value) {
                    sanitized.insert(key.clone(), clean);
                }
            }
            BlockSanitization::Passthrough => {
                sanitized.insert(key.clone(), value.clone());
            }
        }
    }

    Some(Value::Object(sanitized))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_missing_layout_tag_is_dropped() {
        let blocks = vec![
            json!({"acf_fc_layout": "hero", "heading": "Hi"}),
            json!({"heading": "no layout"}),
            json!({"acf_fc_layout": "cta", "label": "Go"}),
        ];
        let out = sanitize_blocks(&blocks, BlockSanitization::Recursive);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0][LAYOUT_TAG], "hero");
        assert_eq!(out[1][LAYOUT_TAG], "cta");
    }

    #[test]
    fn non_object_block_is_dropped() {
        let blocks = vec![json!("not a block"), json!(["nor", "this"])];
        assert!(sanitize_blocks(&blocks, BlockSanitization::Recursive).is_empty());
    }

    #[test]
    fn non_string_layout_tag_is_dropped() {
        let blocks = vec![json!({"acf_fc_layout": 7, "x": 1})];
        assert!(sanitize_blocks(&blocks, BlockSanitization::Recursive).is_empty());
    }

    #[test]
    fn recursive_policy_sanitizes_scalars() {
        let blocks = vec![json!({
            "acf_fc_layout": "hero",
            "heading": "<b>Hi</b><script>x()</script>",
            "count": 2,
            "visible": true
        })];
        let out = sanitize_blocks(&blocks, BlockSanitization::Recursive);
        let heading = out[0]["heading"].as_str().unwrap();
        assert!(heading.contains("<b>Hi</b>"));
        assert!(!heading.contains("script"));
        assert_eq!(out[0]["count"], 2);
        assert_eq!(out[0]["visible"], true);
    }

    #[test]
    fn passthrough_policy_keeps_content_verbatim() {
        let blocks = vec![json!({
            "acf_fc_layout": "hero",
            "heading": "<script>x()</script>"
        })];
        let out = sanitize_blocks(&blocks, BlockSanitization::Passthrough);
        assert_eq!(out[0]["heading"], "<script>x()</script>");
    }

    #[test]
    fn layout_tag_is_plain_text_sanitized_under_both_policies() {
        for policy in [BlockSanitization::Recursive, BlockSanitization::Passthrough] {
            let blocks = vec![json!({"acf_fc_layout": "<em>hero</em>", "x": 1})];
            let out = sanitize_blocks(&blocks, policy);
            assert_eq!(out[0][LAYOUT_TAG], "hero");
        }
    }

    #[test]
    fn order_is_preserved() {
        let blocks = vec![
            json!({"acf_fc_layout": "a"}),
            json!({"acf_fc_layout": "b"}),
            json!({"acf_fc_layout": "c"}),
        ];
        let out = sanitize_blocks(&blocks, BlockSanitization::Recursive);
        let tags: Vec<&str> = out.iter().map(|b| b[LAYOUT_TAG].as_str().unwrap()).collect();
        assert_eq!(tags, ["a", "b", "c"]);
    }

    #[test]
    fn null_block_values_are_omitted() {
        let blocks = vec![json!({"acf_fc_layout": "hero", "subtitle": null})];
        let out = sanitize_blocks(&blocks, BlockSanitization::Recursive);
        assert!(out[0].get("subtitle").is_none());
    }

    #[test]
    fn sanitization_is_idempotent() {
        let blocks = vec![json!({
            "acf_fc_layout": "hero",
            "heading": "<b>Hi</b><script>bad()</script>",
            "meta": {"tags": ["<i>a</i>", 1]}
        })];
        let once = sanitize_blocks(&blocks, BlockSanitization::Recursive);
        let twice = sanitize_blocks(&once, BlockSanitization::Recursive);
        assert_eq!(once, twice);
    }

    #[test]
    fn policy_parse() {
        assert_eq!(
            "recursive".parse::<BlockSanitization>().unwrap(),
            BlockSanitization::Recursive
        );
        assert_eq!(
            "passthrough".parse::<BlockSanitization>().unwrap(),
            BlockSanitization::Passthrough
        );
        assert!("none".parse::<BlockSanitization>().is_err());
    }
}
