use async_trait::async_trait;
use relay_args::FieldValues;
use relay_commands::{ChatSurface, FieldKind, FormField, FormRequest};
use relay_core::Result;
use std::io::{self, BufRead, Write};

/// Terminal chat surface: replies go to stdout, forms are filled in on stdin.
#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl ConsoleSurface {
    fn prompt(field: &FormField) -> String {
        let mut prompt = format!("  {}", field.name);
        match &field.kind {
            FieldKind::Text => {}
            FieldKind::Number => prompt.push_str(" (number)"),
            FieldKind::Select(options) => prompt.push_str(&format!(" [{}]", options.join("/"))),
        }
        if field.required {
            prompt.push_str(" *");
        }
        if let Some(description) = &field.description {
            prompt.push_str(&format!(" - {}", description.replace('\n', " ")));
        }
        prompt.push_str(": ");
        prompt
    }
}

#[async_trait]
impl ChatSurface for ConsoleSurface {
    async fn say(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}\n")?;
        stdout.flush()?;
        Ok(())
    }

    async fn request_form(&self, form: FormRequest) -> Result<Option<FieldValues>> {
        println!("📝 {} / {}", form.server, form.tool);
        if let Some(description) = &form.description {
            println!("{description}");
        }
        println!("(leave a field blank to skip it; end input to cancel)");

        let stdin = io::stdin();
        let mut values = FieldValues::new();
        for field in &form.fields {
            print!("{}", Self::prompt(field));
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                println!();
                return Ok(None);
            }
            let value = line.trim();
            if !value.is_empty() {
                values.insert(field.name.clone(), value.to_string());
            }
        }
        println!();
        Ok(Some(values))
    }
}
