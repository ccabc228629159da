use std::fmt;

use quiz_core::model::{Question, QuestionId, Subject, SubjectId};
use quiz_core::time;
use storage::repository::{NewQuestionRecord, NewSubjectRecord, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    subject_name: String,
    subject_desc: Option<String>,
    questions: u32,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidQuestions { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut subject_name =
            std::env::var("QUIZ_SUBJECT_NAME").unwrap_or_else(|_| "General Knowledge".into());
        let mut subject_desc = std::env::var("QUIZ_SUBJECT_DESC").ok();
        let mut questions = std::env::var("QUIZ_QUESTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--subject" => {
                    subject_name = require_value(&mut args, "--subject")?;
                }
                "--description" => {
                    subject_desc = Some(require_value(&mut args, "--description")?);
                }
                "--questions" => {
                    let value = require_value(&mut args, "--questions")?;
                    questions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidQuestions { raw: value })?;
                }
                other => return Err(ArgsError::UnknownArg(other.to_owned())),
            }
        }

        Ok(Self {
            db_url,
            subject_name,
            subject_desc,
            questions,
        })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse()?;
    let now = time::Clock::default().now();
    let storage = Storage::sqlite(&args.db_url).await?;

    let draft = Subject::new(
        SubjectId::new(1),
        args.subject_name.clone(),
        args.subject_desc.clone(),
        now,
    )?;
    let subject_id = storage
        .subjects
        .insert_new_subject(NewSubjectRecord::from_subject(&draft))
        .await?;

    let samples = [
        ("Which planet is closest to the sun?", 0_usize),
        ("How many continents are there?", 2),
        ("What is the largest ocean?", 3),
        ("Which gas do plants absorb?", 1),
        ("What is the capital of Portugal?", 2),
    ];
    for i in 0..args.questions {
        let idx = (i as usize) % samples.len();
        let (prompt, correct_option) = samples[idx];
        let question = Question::new(
            QuestionId::new(u64::from(i + 1)),
            subject_id,
            format!("{prompt} (#{})", i + 1),
            vec![
                "Option A".into(),
                "Option B".into(),
                "Option C".into(),
                "Option D".into(),
            ],
            correct_option,
            None,
        )?;
        storage
            .questions
            .insert_new_question(NewQuestionRecord::from_question(&question))
            .await?;
    }

    println!(
        "Seeded subject {} ({}) with {} questions into {}",
        subject_id.value(),
        args.subject_name,
        args.questions,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
