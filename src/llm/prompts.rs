//! LLM prompts for page generation and correctness judging.
//!
//! Templates use `{placeholder}` markers filled by [`Prompts::fill`].

/// Collection of prompts used by the generator and the judges.
pub struct Prompts;

impl Prompts {
    /// Substitute `{key}` markers in one pass.
    ///
    /// Substituted values are never rescanned, so braces inside document
    /// text or model output pass through untouched. Unknown markers are kept.
    pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let hit = values.iter().find(|(key, _)| {
                tail[1..].starts_with(key) && tail[1 + key.len()..].starts_with('}')
            });
            match hit {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &tail[key.len() + 2..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// System prompt for page generation.
    pub fn system_page_writer() -> &'static str {
        "You are an expert encyclopedia editor. You write accurate, well-structured Wikipedia articles in Markdown, using only the information contained in the sources you are given."
    }

    /// Prompt to write a Wikipedia-style page from retrieved chunks.
    ///
    /// Placeholders: `{topic}`, `{target_audience}`, `{context}`.
    pub fn wikipedia_page() -> &'static str {
        r#"Write a complete Wikipedia page about the following topic:

{topic}

The page is intended for this audience: {target_audience}

Use the context below as your only source of facts. Each context entry gives the source it was taken from, followed by a chunk of that source.

Context:
{context}

Structure the page like a real Wikipedia article: a lead section summarizing the topic, followed by sections with Markdown headings (for example structure, function, clinical significance, history). Keep the figures, names and data cited in the context exact. Do not invent facts that the context does not support.

Return only the Markdown page."#
    }

    /// System prompt for correctness judges.
    pub fn system_judge() -> &'static str {
        "You are a strict evaluator of encyclopedia articles. Always respond with valid JSON when requested."
    }

    /// Correctness rubric comparing a candidate page to the real page.
    ///
    /// Placeholders: `{input}`, `{actual_output}`, `{expected_output}`.
    pub fn correctness_judge() -> &'static str {
        r#"The expected output is the real Wikipedia page on a given topic, while the actual output is a potential Wikipedia page on the same topic: your goal is to determine on a scale from 1 to 5 whether the actual output is a good Wikipedia page based on the expected output. You should put particular attention on the accuracy of the facts and data cited in the actual output with respect to the ones cited in the expected output.

Evaluation steps:
1. Check whether the facts in the actual output contradict any facts in the expected output.
2. Heavily penalize incorrect figures, names, dates and measurements.
3. Penalize omission of the major topics covered by the expected output.
4. Vague wording and differences in style are acceptable.

Input:
{input}

Actual output:
{actual_output}

Expected output:
{expected_output}

Respond in JSON format:
{
    "score": <integer from 1 to 5>,
    "reason": "<concise explanation of the score, citing the decisive facts>"
}

Respond with only the JSON, no other text."#
    }
}
