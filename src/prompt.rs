use std::io::{self, BufRead, Write};

/// Asks `question` until the answer is a yes or a no. End of input counts as no.
pub fn ask_for_confirmation<R, W>(question: &str, input: &mut R, output: &mut W) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    let mut answer = String::new();

    loop {
        write!(output, "{question} [y/n]: ")?;
        output.flush()?;

        answer.clear();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }

        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {}
        }
    }
}
