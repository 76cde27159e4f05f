//! Question answering from the command line

use std::io::BufRead;
use std::io::Write;

use uuid::Uuid;

use crate::api::connect_state;
use crate::cli::output::print_answer;
use crate::models::ChatTurn;
use crate::rag::AskQuery;
use crate::rag::RagService;
use crate::AppConfig;
use crate::Result;

/// `docrag ask`: one-shot when a question is given, otherwise interactive
pub async fn handle_ask_command(
    config: &AppConfig,
    question: Option<String>,
    top_k: Option<usize>,
    document: Option<Uuid>,
) -> Result<()> {
    let (_database, state) = connect_state(config).await?;

    if let Some(question) = question {
        let response = state
            .rag
            .ask(AskQuery {
                question,
                top_k,
                document_id: document,
                history: Vec::new(),
            })
            .await?;
        print_answer(&response);
        return Ok(());
    }

    println!("💬 Ask questions about your documents. Type 'exit' to quit.");
    println!();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_interactive_session(&state.rag, stdin.lock(), stdout.lock(), top_k, document).await?;
    Ok(())
}

/// Read questions line by line until `exit` or end of input, writing each
/// answer. Earlier turns are sent as history. Returns the session history.
///
/// A failed question is reported and the session continues.
pub async fn run_interactive_session<R, W>(
    rag: &RagService,
    mut input: R,
    mut output: W,
    top_k: Option<usize>,
    document: Option<Uuid>,
) -> Result<Vec<ChatTurn>>
where
    R: BufRead,
    W: Write,
{
    let mut history: Vec<ChatTurn> = Vec::new();

    loop {
        write!(output, "You: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if question == "exit" {
            break;
        }

        let query = AskQuery {
            question: question.to_string(),
            top_k,
            document_id: document,
            history: history.clone(),
        };

        match rag.ask(query).await {
            Ok(response) => {
                writeln!(output, "Assistant: {}", response.answer)?;
                if !response.sources.is_empty() {
                    writeln!(output, "  ({} sources)", response.sources.len())?;
                }
                writeln!(output)?;
                history.push(ChatTurn {
                    question: question.to_string(),
                    answer: response.answer,
                });
            }
            Err(e) => {
                writeln!(output, "❌ {e}")?;
                writeln!(output)?;
            }
        }
    }

    writeln!(output, "👋 Goodbye!")?;
    Ok(history)
}
