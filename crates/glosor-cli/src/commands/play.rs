//! The `glosor play` command.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;

use glosor_core::report::SessionReport;
use glosor_core::session::{Question, SessionPhase};
use glosor_core::traits::VocabularyStore;
use glosor_core::{SessionEngine, SessionError};
use glosor_store::{open_store, GlosorConfig};

use crate::PlayArgs;

const COMMIT_ATTEMPTS: u32 = 3;
const COMMIT_BACKOFF: Duration = Duration::from_millis(200);

pub fn execute(args: PlayArgs, config: Option<&Path>, database: Option<&Path>) -> Result<()> {
    let mut config = super::load_config(config, database)?;
    apply_overrides(&mut config, &args)?;

    let store = open_store(&config)?;
    let mut engine = match config.seed {
        Some(seed) => SessionEngine::with_seed(store, seed),
        None => SessionEngine::new(store),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let report = play(&mut engine, &config, stdin.lock(), stdout.lock())?;

    print_summary(&report);

    if let Some(dir) = &config.report_dir {
        let path = report.save_in(dir)?;
        eprintln!("Report saved to: {}", path.display());
    }

    anyhow::ensure!(
        config.no_commit || report.pending_marks == 0,
        "{} mark(s) could not be saved",
        report.pending_marks
    );
    Ok(())
}

fn apply_overrides(config: &mut GlosorConfig, args: &PlayArgs) -> Result<()> {
    if let Some(words) = args.words {
        config.words_per_round = words;
    }
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }
    if let Some(call_language) = args.call_language {
        config.call_language = call_language;
    }
    if let Some(list) = &args.parts_of_speech {
        config.parts_of_speech = parse_list(list)?;
    }
    if let Some(list) = &args.categories {
        config.word_categories = parse_list(list)?;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_commit {
        config.no_commit = true;
    }
    if args.report_dir.is_some() {
        config.report_dir.clone_from(&args.report_dir);
    }
    Ok(())
}

fn parse_list<T: FromStr<Err = String>>(list: &str) -> Result<Vec<T>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(|e| anyhow::anyhow!(e)))
        .collect()
}

/// Run one interactive session over `input` and `output`.
///
/// End of input during the primary pass abandons the session. End of input
/// at the retest prompt or during the retest finishes it normally.
pub fn play<S, R, W>(
    engine: &mut SessionEngine<S>,
    config: &GlosorConfig,
    mut input: R,
    mut output: W,
) -> Result<SessionReport>
where
    S: VocabularyStore,
    R: BufRead,
    W: Write,
{
    let mut session = engine.start_session(config.session_request())?;
    writeln!(
        output,
        "Session of {} question(s). Answer in the {} language.\n",
        session.total_questions(),
        answer_side(config)
    )?;

    loop {
        match session.phase() {
            SessionPhase::AwaitingAnswer => {
                let question = session.current_question()?;
                print_question(&mut output, &question)?;
                let Some(answer) = read_line(&mut input)? else {
                    if session.is_retest() {
                        session.finish();
                        break;
                    }
                    session.abandon();
                    writeln!(output, "\nSession abandoned, nothing was saved.")?;
                    return Ok(session.report());
                };
                let outcome = session.submit_answer(&answer)?;
                if outcome.correct {
                    writeln!(output, "Correct!\n")?;
                } else {
                    writeln!(output, "Wrong. Answer: {}\n", outcome.correct_answer)?;
                }
            }
            SessionPhase::RoundComplete => {
                let missed = session.incorrect_ids().len();
                write!(output, "You missed {missed} word(s). Retest? [y/N] ")?;
                output.flush()?;
                let accept = read_line(&mut input)?
                    .is_some_and(|line| line.trim().eq_ignore_ascii_case("y"));
                if accept {
                    engine.start_retest(&mut session)?;
                    writeln!(output, "\nRetest of {} question(s).\n", session.total_questions())?;
                } else {
                    session.finish();
                }
            }
            SessionPhase::Finished => break,
        }
    }

    if config.no_commit {
        writeln!(output, "Practice mode, marks were not saved.")?;
    } else {
        commit_with_retry(engine, &mut session)?;
    }
    Ok(session.report())
}

fn commit_with_retry<S: VocabularyStore>(
    engine: &mut SessionEngine<S>,
    session: &mut glosor_core::Session,
) -> Result<()> {
    let mut attempt = 1;
    loop {
        match engine.commit(session) {
            Ok(_) => return Ok(()),
            Err(SessionError::Commit { source, .. })
                if source.is_transient() && attempt < COMMIT_ATTEMPTS =>
            {
                tracing::warn!(attempt, "retrying commit: {source}");
                std::thread::sleep(COMMIT_BACKOFF * attempt);
                attempt += 1;
            }
            Err(e @ SessionError::Commit { .. }) => {
                tracing::error!("giving up on commit after {attempt} attempt(s): {e}");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn answer_side(config: &GlosorConfig) -> &'static str {
    match config.call_language {
        glosor_core::model::CallLanguage::Source => "target",
        glosor_core::model::CallLanguage::Target => "source",
    }
}

fn print_question<W: Write>(output: &mut W, question: &Question) -> io::Result<()> {
    let p = question.progress;
    let label = if question.retest { "Retest round" } else { "Round" };
    writeln!(
        output,
        "{label} {}/{}  Question {}/{}",
        p.round_number, p.total_rounds, p.question_in_round, p.questions_per_round
    )?;
    writeln!(output, "  {}", question.question)?;
    if let Some(hint) = &question.grammar_hint {
        writeln!(output, "  ({hint})")?;
    }
    if let Some(hint) = &question.context_hint {
        writeln!(output, "  hint: {hint}")?;
    }
    if let Some(link) = &question.link {
        writeln!(output, "  see: {link}")?;
    }
    write!(output, "> ")?;
    output.flush()
}

/// Next line without its terminator, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn print_summary(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Answered", "Correct", "Score", "Saved marks", "Retest"]);
    table.add_row(vec![
        Cell::new(report.answered),
        Cell::new(report.correct),
        Cell::new(
            report
                .score_percent
                .map(|s| format!("{s:.1}%"))
                .unwrap_or_else(|| "-".into()),
        ),
        Cell::new(report.committed_marks),
        Cell::new(if report.retest_taken { "yes" } else { "no" }),
    ]);
    eprintln!("\n{table}");

    if !report.missed.is_empty() {
        let mut missed = Table::new();
        missed.set_header(vec!["Missed", "Answer"]);
        for word in &report.missed {
            missed.add_row(vec![Cell::new(&word.question), Cell::new(&word.answer)]);
        }
        eprintln!("{missed}");
    }
}
