use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use sl_core::StoryGraph;
use sl_play::{PuzzleOutcome, TraversalSession};

const HELP: &str = "\
  <number>   take a choice
  <answer>   answer the puzzle on a puzzle scene
  back       go back one step
  restart    start over
  history    show the path so far
  jump <n>   go back to step n of the history
  quit       leave";

pub fn run(file: &Path) -> Result<(), String> {
    let graph = super::load_story(file)?;
    let mut session = TraversalSession::new(&graph).map_err(|e| e.to_string())?;

    let title = graph.title.as_deref().unwrap_or("Untitled story");
    println!("  {} {title}", "Playing".bold());
    println!("  Type a choice number, 'help' for commands, 'quit' to exit.");
    show_scene(&graph, &session);

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
            break;
        }
        handle(&graph, &mut session, input);
    }

    Ok(())
}

fn handle(graph: &StoryGraph, session: &mut TraversalSession, input: &str) {
    let mut words = input.split_whitespace();
    let command = words.next().unwrap_or_default().to_lowercase();

    match command.as_str() {
        "help" => println!("{HELP}\n"),
        "back" => {
            if session.go_back() {
                show_scene(graph, session);
            } else {
                println!("{}\n", "Already at the start.".yellow());
            }
        }
        "restart" => {
            session.restart();
            show_scene(graph, session);
        }
        "history" => {
            for (i, entry) in session.history().iter().enumerate() {
                match entry.choice {
                    Some(choice) => println!("  {}. {} (choice {})", i + 1, entry.scene_id, choice + 1),
                    None => println!("  {}. {}", i + 1, entry.scene_id),
                }
            }
            println!();
        }
        "jump" => {
            let jumped = words
                .next()
                .and_then(|w| w.parse::<usize>().ok())
                .and_then(|n| n.checked_sub(1))
                .is_some_and(|index| session.jump_to(index));
            if jumped {
                show_scene(graph, session);
            } else {
                println!("{}\n", "No such step. Type 'history' to see the steps.".yellow());
            }
        }
        _ if session.current_scene(graph).is_some_and(|s| s.is_puzzle()) => {
            answer(graph, session, input);
        }
        _ => match input.parse::<usize>() {
            Ok(n) => take_choice(graph, session, n),
            Err(_) => println!("{}\n", "Unknown command. Type 'help'.".yellow()),
        },
    }
}

fn take_choice(graph: &StoryGraph, session: &mut TraversalSession, number: usize) {
    let visible = session.visible_choices(graph);
    let Some(choice) = number.checked_sub(1).and_then(|i| visible.get(i)) else {
        println!("{}\n", format!("There is no choice {number}.").yellow());
        return;
    };
    if let Some(reason) = choice.disabled_reason() {
        println!("{}\n", reason.yellow());
        return;
    }

    let index = choice.index;
    match session.choose(graph, index) {
        Ok(_) => show_scene(graph, session),
        Err(e) => println!("{}\n", e.to_string().yellow()),
    }
}

fn answer(graph: &StoryGraph, session: &mut TraversalSession, input: &str) {
    let outcome = match session.submit_answer(graph, input) {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("{}\n", e.to_string().yellow());
            return;
        }
    };

    match outcome {
        PuzzleOutcome::Solved { next } => {
            println!("  {}", "Correct!".green().bold());
            if next.is_none() {
                println!("{}\n", "This path has no next scene yet.".yellow());
                return;
            }
            show_scene(graph, session);
        }
        PuzzleOutcome::Failed { next } => {
            println!("  {}", "Out of attempts.".red().bold());
            if next.is_none() {
                println!("{}\n", "This path has no next scene yet.".yellow());
                return;
            }
            show_scene(graph, session);
        }
        PuzzleOutcome::Retry {
            remaining, hint, ..
        } => {
            println!(
                "  Not quite. {remaining} attempt{} left.",
                if remaining == 1 { "" } else { "s" }
            );
            if let Some(hint) = hint {
                println!("  {} {hint}", "Hint:".cyan());
            }
            println!();
        }
    }
}

fn show_scene(graph: &StoryGraph, session: &TraversalSession) {
    println!();
    match session.current_scene(graph) {
        None => println!("  {}", "This path leads nowhere.".dimmed()),
        Some(scene) => {
            println!("{}\n", scene.text);
            if let Some(puzzle) = scene.active_puzzle() {
                println!("  {} {}", "Puzzle:".bold(), puzzle.prompt);
                for hint in session.revealed_hints(graph) {
                    println!("  {} {hint}", "Hint:".cyan());
                }
                println!("  Type your answer.");
            } else {
                for (n, choice) in session.visible_choices(graph).iter().enumerate() {
                    match choice.disabled_reason() {
                        None => println!("  {}. {}", n + 1, choice.text),
                        Some(reason) => println!(
                            "  {}",
                            format!("{}. {} ({reason})", n + 1, choice.text).dimmed()
                        ),
                    }
                }
            }
        }
    }

    if session.is_ending(graph) {
        println!();
        println!(
            "  {} You saw {:.0}% of the story. Type 'restart' or 'quit'.",
            "The End.".bold(),
            session.progress(graph) * 100.0
        );
    }
    println!();
}
