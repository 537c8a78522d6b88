use crate::app::StudyApp;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use super::{Command, SessionArgs};

/// Run a parsed command for `owner` and print its result.
pub fn handle_command(command: Command, owner: &str, app: &StudyApp) -> Result<()> {
    match command {
        Command::Extract { path } => {
            println!("{}", app.extract_file(&path)?);
            Ok(())
        }
        Command::Upload { path, title } => {
            print_json(&app.upload_file(owner, &path, title.as_deref())?)
        }
        Command::List {} => print_json(&app.list(owner)?),
        Command::Show { id } => print_json(&app.show(owner, id)?),
        Command::Delete { id } => {
            app.delete(owner, id)?;
            println!("note {id} deleted");
            Ok(())
        }
        Command::Summary { id, cached } => {
            if cached {
                print_json(&app.summary(owner, id)?)
            } else {
                print_json(&app.generate_summary(owner, id)?)
            }
        }
        Command::Flashcards { id, cached } => {
            if cached {
                print_json(&app.flashcards(owner, id)?)
            } else {
                print_json(&app.generate_flashcards(owner, id)?)
            }
        }
        Command::Quiz { id, cached } => {
            if cached {
                print_json(&app.quiz(owner, id)?)
            } else {
                print_json(&app.generate_quiz(owner, id)?)
            }
        }
        Command::Search { query } => print_json(&app.search(owner, &query)?),
        Command::Session { action } => match action {
            SessionArgs::Start { note_id, kind } => {
                print_json(&app.start_session(owner, note_id, kind)?)
            }
            SessionArgs::Finish {
                session_id,
                score,
                completed,
            } => print_json(&app.finish_session(owner, session_id, score, completed)?),
        },
    }
}

/// Pretty-print `value` as JSON. Embedding vectors are left out.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut value = serde_json::to_value(value)?;
    strip_embeddings(&mut value);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn strip_embeddings(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("embedding");
            map.values_mut().for_each(strip_embeddings);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_embeddings),
        _ => {}
    }
}
