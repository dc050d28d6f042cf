// Resume parsing LLM prompt templates.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are a resume parser. \
Extract the candidate's details from the resume text into the provided schema. \
Copy facts from the resume; do not invent employers, schools, dates or contact details. \
Use an empty string for any text field the resume does not mention and an empty array \
for any list with no entries.";

/// Overview policy: always a summary, a career name only when the resume supports one.
pub const OVERVIEW_FALLBACK_SYSTEM: &str = "\
If nothing can be parsed for the overview section, write a short career summary \
from the rest of the resume and leave career_name as an empty string. \
resume_summary must never be empty.";

pub const RESUME_PARSE_PROMPT: &str = "Parse this resume text:\n\n{resume_text}";

pub const RESUME_SCHEMA_NAME: &str = "resume_data";
