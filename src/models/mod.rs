use serde::{Deserialize, Serialize};

/// Question author as the backend nests it inside round-question links.
///
/// Kept minimal; extra backend fields are ignored on deserialize.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Author {
    pub id: i64,
    pub username: String,
}

/// One typed node of a question's rich-text content tree.
///
/// The backend stores content as a node tree, not a flat string: paragraphs
/// contain text runs and images. `type` is the discriminator on the wire.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum ContentNode {
    Paragraph { children: Vec<ContentNode> },
    Text { text: String },
    Image { url: String },
}

impl ContentNode {
    /// Flatten a content tree to plain text, one line per paragraph.
    /// Images contribute nothing. Used for previews and the plain editor.
    pub fn to_plain_text(nodes: &[ContentNode]) -> String {
        let mut lines: Vec<String> = vec![];
        for node in nodes {
            match node {
                ContentNode::Paragraph { children } => {
                    let mut line = String::new();
                    for child in children {
                        if let ContentNode::Text { text } = child {
                            line.push_str(text);
                        }
                    }
                    lines.push(line);
                }
                ContentNode::Text { text } => lines.push(text.clone()),
                ContentNode::Image { .. } => {}
            }
        }
        lines.join("\n")
    }

    /// Build a content tree from plain text, one paragraph per line.
    ///
    /// Lossy inverse of `to_plain_text`: images typed out as text stay text.
    /// The plain editor only produces paragraph/text nodes.
    pub fn from_plain_text(text: &str) -> Vec<ContentNode> {
        text.lines()
            .map(|line| ContentNode::Paragraph {
                children: vec![ContentNode::Text {
                    text: line.to_string(),
                }],
            })
            .collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Question {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: Vec<ContentNode>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub topic: String,
    /// 1..=5, informational only on this side.
    pub difficulty: i32,
    #[serde(default)]
    pub is_generated: bool,
    #[serde(default)]
    pub fact_checked: bool,
    #[serde(default)]
    pub author: Option<Author>,
}

/// Join record placing a question at a position within a round.
///
/// Distinct from the question's identity: the same question may appear in
/// several rounds through distinct links.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct RoundQuestion {
    pub id: i64,
    pub round_id: i64,
    pub question_id: i64,
    /// Zero-based, contiguous within the round after any reorder.
    pub order_index: i32,
    pub question: Question,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Round {
    pub id: i64,
    pub package_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Target number of questions; display-only, never enforced.
    pub question_count: i32,
    /// Zero-based, contiguous within the package after any reorder.
    pub order_index: i32,
    #[serde(default)]
    pub round_questions: Vec<RoundQuestion>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Package {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub play_date: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub rounds: Vec<Round>,
}

/// Package list entry (GET /api/packages returns these without rounds).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct PackageSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub play_date: Option<String>,
    #[serde(default)]
    pub round_count: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RecentPackage {
    pub id: i64,
    pub title: String,
    pub last_opened_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_node_wire_shape() {
        // Contract: internally tagged nodes, lowercase discriminator.
        let json = r#"[
            {"type": "paragraph", "children": [
                {"type": "text", "text": "Who painted it?"},
                {"type": "image", "url": "/uploads/q1.png"}
            ]}
        ]"#;
        let nodes: Vec<ContentNode> = serde_json::from_str(json).expect("content should parse");
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            ContentNode::Paragraph { children } => {
                assert_eq!(children.len(), 2);
                assert!(matches!(&children[0], ContentNode::Text { text } if text == "Who painted it?"));
                assert!(matches!(&children[1], ContentNode::Image { url } if url == "/uploads/q1.png"));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_round_trip_for_paragraphs() {
        let nodes = ContentNode::from_plain_text("line one\nline two");
        assert_eq!(nodes.len(), 2);
        assert_eq!(ContentNode::to_plain_text(&nodes), "line one\nline two");
    }

    #[test]
    fn test_plain_text_skips_images() {
        let nodes = vec![ContentNode::Paragraph {
            children: vec![
                ContentNode::Text {
                    text: "before".to_string(),
                },
                ContentNode::Image {
                    url: "x.png".to_string(),
                },
            ],
        }];
        assert_eq!(ContentNode::to_plain_text(&nodes), "before");
    }

    #[test]
    fn test_package_tree_contract_deserialize() {
        let json = r#"{
            "id": 3,
            "title": "Spring quiz",
            "description": "",
            "play_date": "2026-04-01",
            "author": {"id": 1, "username": "eve"},
            "rounds": [{
                "id": 10,
                "package_id": 3,
                "name": "Warmup",
                "description": "easy ones",
                "question_count": 6,
                "order_index": 0,
                "round_questions": [{
                    "id": 100,
                    "round_id": 10,
                    "question_id": 55,
                    "order_index": 0,
                    "question": {
                        "id": 55,
                        "title": "Capitals",
                        "content": [],
                        "answer": "Oslo",
                        "topic": "geography",
                        "difficulty": 2,
                        "is_generated": false,
                        "fact_checked": true
                    }
                }]
            }]
        }"#;
        let pkg: Package = serde_json::from_str(json).expect("package tree should parse");
        assert_eq!(pkg.rounds.len(), 1);
        assert_eq!(pkg.rounds[0].round_questions[0].question.answer, "Oslo");
        assert!(pkg.rounds[0].round_questions[0].question.fact_checked);
    }

    #[test]
    fn test_question_defaults_tolerate_sparse_payloads() {
        // List endpoints omit content/flags for brevity.
        let json = r#"{"id": 7, "title": "Sparse", "difficulty": 4}"#;
        let q: Question = serde_json::from_str(json).expect("sparse question should parse");
        assert!(q.content.is_empty());
        assert!(!q.is_generated);
        assert!(q.author.is_none());
    }
}
