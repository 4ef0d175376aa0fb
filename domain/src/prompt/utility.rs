//! Prompt texts for the single-agent utilities

/// Templates for the email writer and the content publisher
pub struct UtilityPrompt;

impl UtilityPrompt {
    /// Instruction for the email writer.
    ///
    /// The JSON example is not a placeholder: its braces do not wrap a key.
    pub fn email_writer() -> &'static str {
        r#"Understand the user's request and write an email with the following fields:
- Date {todays_date}
- From address {user_email}
- To address
- Subject
- Body

IMPORTANT: your response MUST be valid JSON matching this schema:
{
    "date": "Date of the email here",
    "from_address": "Sender of the email here",
    "to_address": "Recipient of the email here",
    "subject": "Subject line here",
    "body": "Email body here"
}

Do not include any other text than the JSON response."#
    }

    /// Instruction for the content publisher
    pub fn content_publisher() -> &'static str {
        r#"You are a content publishing agent. Take the markdown input from the user,
convert it to a PDF artifact with the markdown_to_pdf tool, then save the PDF as a
local file with the publish_pdf tool.

- markdown_to_pdf takes markdown text and an optional filename and returns the
  artifact name.
- publish_pdf takes that artifact name and an optional filename and returns the
  saved file path.

If a tool reports an error, explain it to the user. Finish with a clear summary
of the actions taken and the location of the saved file."#
    }
}
