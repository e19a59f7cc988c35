//! Line-based front ends for word and paragraph practice.

use std::error::Error;

use pinyin_core::model::{PracticeSettings, VocabularyItem};
use services::paragraph::{ParagraphError, ParagraphFeedback, ParagraphPractice, ParagraphService};
use services::{
    Advance, AppServices, PracticeSession, SessionError, StatsSummary, SubmitOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};

type AppResult = Result<(), Box<dyn Error>>;

//
// ─── WORD PRACTICE ─────────────────────────────────────────────────────────────
//

pub async fn run_practice(services: &AppServices, restart: bool) -> AppResult {
    let settings = services.settings().load().await?;
    let practice = services.practice_loop();

    let opened = if restart {
        practice.start_session().await
    } else {
        practice.resume_session().await
    };
    let mut session = match opened {
        Ok(session) => session,
        Err(SessionError::Empty) => {
            println!("No words match the selected categories and level.");
            println!("Pick categories with `settings --categories pronouns,food`.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!(
        "{} mode, {} words. Type the pinyin; :skip shows the answer, :next moves on, :stats, :quit.",
        session.mode(),
        session.words().len()
    );
    print_word(&session, &settings);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let advance = match line {
            ":quit" | ":q" => break,
            ":stats" => {
                print_session_stats(&session);
                None
            }
            ":skip" => {
                let word = practice.show_answer(&mut session).await?;
                println!("  answer: {}. Type it to continue.", word.pinyin);
                None
            }
            ":next" => match practice.advance(&mut session).await {
                Ok(advance) => Some(advance),
                Err(SessionError::AnswerRequired) => {
                    println!("  type the answer shown above first");
                    None
                }
                Err(err) => return Err(err.into()),
            },
            input => {
                let result = practice.submit(&mut session, input).await?;
                print_outcome(result.outcome, session.current_word());
                result.advance
            }
        };

        match advance {
            Some(Advance::Completed) => {
                println!("All words done.");
                print_session_stats(&session);
                break;
            }
            Some(Advance::Word(_)) => print_word(&session, &settings),
            None => {}
        }
    }

    Ok(())
}

fn print_word(session: &PracticeSession, settings: &PracticeSettings) {
    let Some(word) = session.current_word() else {
        return;
    };
    let progress = session.progress();
    println!();
    println!("[{}/{} {}%]", progress.current, progress.total, progress.percent);
    if settings.show_translation && !word.english.is_empty() {
        println!("  {}  ({})", word.chinese, word.english);
    } else {
        println!("  {}", word.chinese);
    }
}

fn print_outcome(outcome: SubmitOutcome, word: Option<&VocabularyItem>) {
    let answer = word.map_or("", |word| word.pinyin.as_str());
    match outcome {
        SubmitOutcome::Blank => {}
        SubmitOutcome::Correct => println!("  correct"),
        SubmitOutcome::Incorrect => println!("  not quite: {answer}. Type it to continue."),
        SubmitOutcome::Retyped => println!("  ok"),
        SubmitOutcome::RetypeMismatch => println!("  the answer is {answer}"),
    }
}

fn print_session_stats(session: &PracticeSession) {
    let tally = session.tally();
    let stats = session.stats();
    println!(
        "  session: {} correct, {} missed ({}%). streak {} (best {})",
        tally.correct,
        tally.incorrect,
        tally.accuracy(),
        stats.current_streak,
        stats.best_streak
    );
}

//
// ─── PARAGRAPH PRACTICE ────────────────────────────────────────────────────────
//

pub async fn run_paragraph(services: &AppServices) -> AppResult {
    let paragraphs = services.paragraphs();
    if !paragraphs.enabled() {
        println!("Paragraph practice needs PINYIN_AI_API_KEY to be set.");
        return Ok(());
    }

    let Some(mut practice) = new_paragraph(&paragraphs).await? else {
        return Ok(());
    };
    let mut typed: Vec<String> = Vec::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            ":quit" | ":q" => break,
            ":reveal" => println!("  {}", practice.reveal()),
            ":new" => {
                let Some(next) = new_paragraph(&paragraphs).await? else {
                    continue;
                };
                practice = next;
                typed.clear();
            }
            ":undo" => {
                typed.pop();
                let feedback = practice.update_input(&typed.join(" "));
                print_feedback(&practice, feedback);
            }
            input => {
                typed.push(input.to_string());
                let feedback = practice.update_input(&typed.join(" "));
                print_feedback(&practice, feedback);
            }
        }
    }

    Ok(())
}

/// `None` when generation failed; the error is reported and the caller carries on.
async fn new_paragraph(
    paragraphs: &ParagraphService,
) -> Result<Option<ParagraphPractice>, Box<dyn Error>> {
    println!("Generating a paragraph...");
    match paragraphs.generate().await {
        Ok(practice) => {
            println!();
            println!("  {}", practice.paragraph());
            println!();
            println!("Type its pinyin (several lines are joined); :undo, :reveal, :new, :quit.");
            Ok(Some(practice))
        }
        Err(err @ ParagraphError::Storage(_)) => Err(err.into()),
        Err(err) => {
            println!("  could not generate a paragraph: {err}");
            Ok(None)
        }
    }
}

fn print_feedback(practice: &ParagraphPractice, feedback: ParagraphFeedback) {
    let words = practice.words().len();
    let done = practice.completed_words().len();
    match feedback {
        ParagraphFeedback::Idle if practice.is_fallback() => {
            println!("  no transcription came with this paragraph; :new for another");
        }
        ParagraphFeedback::Idle => {}
        ParagraphFeedback::OnTrack { percent } => {
            println!("  on track: {percent}% ({done}/{words} words)");
        }
        ParagraphFeedback::Mismatch { percent } => {
            println!("  mismatch after {percent}%; :undo to drop the last line");
        }
        ParagraphFeedback::Complete => println!("  complete! :new for another paragraph"),
        ParagraphFeedback::Revealed => println!("  answer shown; :new for another paragraph"),
    }
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

pub fn print_summary(summary: &StatsSummary) {
    let stats = &summary.stats;
    println!("attempts:         {}", stats.total_attempts);
    println!("first-try right:  {}", stats.correct_first_try);
    println!("accuracy:         {}%", summary.accuracy);
    println!("words learned:    {}", summary.words_learned);
    println!("current streak:   {}", stats.current_streak);
    println!("best streak:      {}", stats.best_streak);
    println!("words practiced:  {}", summary.tracked_words);
    println!("needing review:   {}", summary.words_with_mistakes);
}

pub fn print_settings(settings: &PracticeSettings) {
    let categories: Vec<&str> = settings
        .selected_categories
        .iter()
        .map(|category| category.as_str())
        .collect();
    println!("mode:         {}", settings.mode);
    println!("level:        {}", settings.level);
    println!("categories:   {}", categories.join(","));
    println!(
        "translation:  {}",
        if settings.show_translation { "on" } else { "off" }
    );
    println!("theme:        {}", settings.theme.as_str());
}
