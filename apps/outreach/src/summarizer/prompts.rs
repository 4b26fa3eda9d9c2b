// Prompt templates for the map-reduce summarizer.
// The same template is used for the map and the combine step; `{text}` is replaced
// with a chunk or with the joined chunk summaries.

/// Template for scraped company websites. Replace `{text}` before sending.
pub const WEBSITE_REPORT_TEMPLATE: &str = r#"Act as an expert outbound researcher.
Write a detailed summary of the following business based on the available data. I'm looking for information such as:
- Type of business with specific categorization
- Relevant clients
- Services offered
- Number of people in the team
- Values of the business

"{text}"

SUMMARY:
"#;

/// Template for professional profile data. Replace `{text}` before sending.
pub const PROFILE_REPORT_TEMPLATE: &str = r#"Act as an expert outbound researcher.
Write a detailed summary of the following person based on their professional profile data. I'm looking for information such as:
- Names of the companies they worked with, and their roles
- Past results achieved for clients
- Whether they transitioned from employment to running their own business
- College education
- City where they are based

"{text}"

SUMMARY:
"#;
