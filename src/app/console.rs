use crate::core::context::{AppContext, StudentForm, TeacherForm};
use crate::core::store::Outcome;
use crate::domain::model::{Collection, Student, Teacher, CLASS_OPTIONS};
use crate::utils::error::{Result, SchoolError};
use std::collections::HashMap;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "\
Commands:
  home                                  Show the home page
  about                                 Show the about page
  login <username> <password>           Log in to the admin portal
  logout                                Log out
  status                                Show login and database status
  list <students|teachers>              List records
  add student name=.. class=.. roll=.. [guardian=..] [contact=..]
  add teacher name=.. subject=.. [qualification=..]
  delete <students|teachers> <id>       Delete a record by id
  help                                  Show this help
  quit                                  Exit
Values with spaces go in double quotes, e.g. name=\"Rahim Sheikh\".";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Home,
    About,
    Login { username: String, password: String },
    Logout,
    Status,
    List(String),
    AddStudent(HashMap<String, String>),
    AddTeacher(HashMap<String, String>),
    Delete { collection: String, id: String },
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Command, String> {
        let tokens = tokenize(line)?;
        let words: Vec<&str> = tokens.iter().map(String::as_str).collect();

        match words.as_slice() {
            ["home"] => Ok(Command::Home),
            ["about"] => Ok(Command::About),
            ["login", username, password] => Ok(Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            }),
            ["login", ..] => Err("Usage: login <username> <password>".to_string()),
            ["logout"] => Ok(Command::Logout),
            ["status"] => Ok(Command::Status),
            ["list", collection] => Ok(Command::List(collection.to_string())),
            ["add", "student", fields @ ..] => Ok(Command::AddStudent(parse_fields(fields)?)),
            ["add", "teacher", fields @ ..] => Ok(Command::AddTeacher(parse_fields(fields)?)),
            ["delete", collection, id] => Ok(Command::Delete {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            ["help"] => Ok(Command::Help),
            ["quit"] | ["exit"] => Ok(Command::Quit),
            [] => Err(String::new()),
            _ => Err(format!("Unknown command: {}. Type 'help'.", line.trim())),
        }
    }
}

/// 以空白切詞，雙引號內的空白保留
fn tokenize(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err("Unterminated quote".to_string());
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_fields(fields: &[&str]) -> std::result::Result<HashMap<String, String>, String> {
    fields
        .iter()
        .map(|field| {
            field
                .split_once('=')
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .ok_or_else(|| format!("Expected key=value, got '{}'", field))
        })
        .collect()
}

fn take(fields: &mut HashMap<String, String>, key: &str) -> String {
    fields.remove(key).unwrap_or_default()
}

fn render_students(students: &[Student]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());
    writer
        .write_record(["Id", "Name", "Class", "RollNumber", "Guardian", "Contact"])
        .map_err(csv_error)?;
    for s in students {
        writer
            .write_record([
                s.id.as_deref().unwrap_or("-"),
                s.name.as_str(),
                s.class.as_str(),
                s.roll_number.to_string().as_str(),
                s.guardian.as_deref().unwrap_or(""),
                s.contact.as_deref().unwrap_or(""),
            ])
            .map_err(csv_error)?;
    }
    into_string(writer)
}

fn render_teachers(teachers: &[Teacher]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());
    writer
        .write_record(["Id", "Name", "Subject", "Qualification"])
        .map_err(csv_error)?;
    for t in teachers {
        writer
            .write_record([
                t.id.as_deref().unwrap_or("-"),
                t.name.as_str(),
                t.subject.as_str(),
                t.qualification.as_deref().unwrap_or(""),
            ])
            .map_err(csv_error)?;
    }
    into_string(writer)
}

fn csv_error(e: csv::Error) -> SchoolError {
    SchoolError::Io(std::io::Error::other(e))
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| SchoolError::Io(std::io::Error::other(e.to_string())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn print_warning<T, W: Write>(out: &mut W, outcome: &Outcome<T>) -> Result<()> {
    if let Some(warning) = outcome.warning() {
        writeln!(out, "⚠️ {}", warning.user_friendly_message())?;
    }
    Ok(())
}

/// 顯示整個 collection；每次異動後都重新讀取一次
async fn show_collection<W: Write>(ctx: &AppContext, name: &str, out: &mut W) -> Result<()> {
    match Collection::parse(name) {
        Some(Collection::Students) => {
            let outcome = ctx.list_students().await?;
            print_warning(out, &outcome)?;
            if outcome.value().is_empty() {
                writeln!(out, "No students found.")?;
            } else {
                write!(out, "{}", render_students(outcome.value())?)?;
            }
        }
        Some(Collection::Teachers) => {
            let outcome = ctx.list_teachers().await?;
            print_warning(out, &outcome)?;
            if outcome.value().is_empty() {
                writeln!(out, "No teachers found.")?;
            } else {
                write!(out, "{}", render_teachers(outcome.value())?)?;
            }
        }
        None => writeln!(out, "Unknown collection '{}'. Use students or teachers.", name)?,
    }
    Ok(())
}

/// 執行一個指令，回傳是否繼續
pub async fn execute<W: Write>(ctx: &mut AppContext, command: Command, out: &mut W) -> Result<bool> {
    match command {
        Command::Home => write!(out, "{}", ctx.home_page())?,
        Command::About => write!(out, "{}", ctx.about_page())?,
        Command::Login { username, password } => {
            ctx.login(&username, &password)?;
            writeln!(out, "✅ Admin Logged In")?;
        }
        Command::Logout => {
            ctx.logout();
            writeln!(out, "Logged out.")?;
        }
        Command::Status => {
            let login = if ctx.auth().is_logged_in() {
                "logged in"
            } else {
                "logged out"
            };
            writeln!(out, "Admin: {}", login)?;
            writeln!(out, "Database: {}", ctx.store().backend_name())?;
            if let Some(warning) = ctx.store().startup_warning() {
                writeln!(out, "⚠️ {}", warning.user_friendly_message())?;
            }
        }
        Command::List(collection) => show_collection(ctx, &collection, out).await?,
        Command::AddStudent(mut fields) => {
            let form = StudentForm {
                name: take(&mut fields, "name"),
                class: take(&mut fields, "class"),
                roll: take(&mut fields, "roll"),
                guardian: take(&mut fields, "guardian"),
                contact: take(&mut fields, "contact"),
            };
            let outcome = ctx.add_student(form).await?;
            print_warning(out, &outcome)?;
            if outcome.value().is_some() {
                writeln!(out, "Student added successfully!")?;
                show_collection(ctx, "students", out).await?;
            }
        }
        Command::AddTeacher(mut fields) => {
            let form = TeacherForm {
                name: take(&mut fields, "name"),
                subject: take(&mut fields, "subject"),
                qualification: take(&mut fields, "qualification"),
            };
            let outcome = ctx.add_teacher(form).await?;
            print_warning(out, &outcome)?;
            if outcome.value().is_some() {
                writeln!(out, "Teacher added successfully!")?;
                show_collection(ctx, "teachers", out).await?;
            }
        }
        Command::Delete { collection, id } => {
            let outcome = match Collection::parse(&collection) {
                Some(Collection::Students) => ctx.delete_student(&id).await?,
                Some(Collection::Teachers) => ctx.delete_teacher(&id).await?,
                None => {
                    writeln!(out, "Unknown collection '{}'.", collection)?;
                    return Ok(true);
                }
            };
            print_warning(out, &outcome)?;
            if !outcome.is_degraded() {
                if *outcome.value() {
                    writeln!(out, "Deleted {}.", id)?;
                } else {
                    writeln!(out, "No record with id {}.", id)?;
                }
                show_collection(ctx, &collection, out).await?;
            }
        }
        Command::Help => {
            writeln!(out, "{}", HELP)?;
            writeln!(out, "Classes: {}", CLASS_OPTIONS.join(", "))?;
        }
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// 逐行讀取指令直到 quit 或輸入結束。使用者層級的錯誤只顯示，不中止。
pub async fn run<R, W>(ctx: &mut AppContext, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let school = ctx.config().school.name.clone();
    writeln!(out, "{} - type 'help' for commands", school)?;
    if let Some(warning) = ctx.store().startup_warning() {
        writeln!(out, "⚠️ {}", warning.user_friendly_message())?;
    }

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) if message.is_empty() => continue,
            Err(message) => {
                writeln!(out, "❌ {}", message)?;
                continue;
            }
        };

        match execute(ctx, command, out).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(SchoolError::Io(e)) => return Err(SchoolError::Io(e)),
            Err(e) => {
                tracing::debug!("Command failed: {} ({:?})", e, e.category());
                writeln!(out, "❌ {}", e.user_friendly_message())?;
            }
        }
    }

    writeln!(out)?;
    Ok(())
}
