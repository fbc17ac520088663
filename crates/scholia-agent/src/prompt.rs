use scholia_core::agent::DocumentContext;
use scholia_core::chat::{ChatMessage, ToolSpec};

/// User turn of the few-shot pair that demonstrates the diagram format.
pub const FEW_SHOT_QUESTION: &str = "Please draw a flowchart of the XXX procedure.";

/// Assistant turn of the few-shot pair.
pub const FEW_SHOT_ANSWER: &str = r#"{
  "answer": "Here is the chart you asked for:",
  "diagram": {
    "type": "mermaid",
    "title": "XXX procedure",
    "code": "graph TD\n  A[Input] --> B[Step one]\n  B --> C[Step two]\n  C --> D[Output]"
  }
}"#;

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not available)"
    } else {
        value
    }
}

/// The operating instruction for one question about one document.
pub fn system_prompt(context: &DocumentContext, tools: &[ToolSpec]) -> String {
    let mut tool_lines = String::new();
    for tool in tools {
        tool_lines.push_str(&format!("- `{}`: {}\n", tool.name, tool.description));
    }

    format!(
        "You are an expert assistant for reading academic papers, able to plan and call tools.\n\
         \n\
         # Tools\n\
         {tool_lines}\
         \n\
         # How to answer\n\
         - For questions about details of the paper, call the search tool first and answer from \
         what it returns.\n\
         - When the user asks for a diagram (a mind map or a flowchart), gather the needed content \
         with the search tool if it is not already in the overview below, then call the matching \
         diagram tool.\n\
         - When a diagram was requested, your final reply MUST be a single JSON object and nothing \
         else:\n\
         {{\"answer\": \"<text, may be empty>\", \"diagram\": {{\"type\": \"mermaid\", \"title\": \
         \"<title>\", \"code\": \"<mermaid code>\"}}}}\n\
         - Otherwise reply with the answer text, or the same JSON object with \"diagram\": null.\n\
         \n\
         # Paper overview\n\
         ## Title: {title}\n\
         ## Summary:\n{summary}\n\
         ## Key content:\n{key_content}\n\
         ## Research context:\n{research_context}\n",
        title = or_placeholder(&context.title),
        summary = or_placeholder(&context.summary),
        key_content = or_placeholder(&context.key_content),
        research_context = or_placeholder(&context.research_context),
    )
}

/// Few-shot pair followed by the real question.
pub fn opening_messages(question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::user(FEW_SHOT_QUESTION),
        ChatMessage::assistant(FEW_SHOT_ANSWER),
        ChatMessage::user(question),
    ]
}
