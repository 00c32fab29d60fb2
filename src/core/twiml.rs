//! Call-control documents (TwiML).
//!
//! [`ResponseBuilder`] is the only way turn logic produces markup. It is total:
//! every combination of payload and next step yields a well-formed document that
//! ends in a terminal branch, so a call can never be left waiting on a response
//! that has no way to finish.

use std::fmt;

/// Capture window applied to every `<Gather>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureWindow {
    /// Seconds to wait for the caller to start speaking
    pub timeout_secs: u32,
    /// Seconds of silence that end the utterance
    pub speech_timeout_secs: u32,
}

impl Default for CaptureWindow {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            speech_timeout_secs: 2,
        }
    }
}

/// A single TwiML verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Speak text with the telephony provider's built-in voice.
    Say {
        text: String,
        voice: String,
        language: Option<String>,
    },
    /// Play audio fetched from a URL.
    Play { url: String },
    /// Listen for caller speech and post the result to `action`.
    Gather {
        action: String,
        timeout_secs: u32,
        speech_timeout_secs: u32,
        language: Option<String>,
        /// Verbs played while listening
        prompt: Vec<Verb>,
    },
    Hangup,
}

impl Verb {
    pub fn name(&self) -> &'static str {
        match self {
            Verb::Say { .. } => "Say",
            Verb::Play { .. } => "Play",
            Verb::Gather { .. } => "Gather",
            Verb::Hangup => "Hangup",
        }
    }

    fn render_into(&self, xml: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Verb::Say {
                text,
                voice,
                language,
            } => {
                xml.push_str(&format!("{indent}<Say voice=\"{}\"", xml_escape(voice)));
                if let Some(language) = language {
                    xml.push_str(&format!(" language=\"{}\"", xml_escape(language)));
                }
                xml.push_str(&format!(">{}</Say>\n", xml_escape(text)));
            }
            Verb::Play { url } => {
                xml.push_str(&format!("{indent}<Play>{}</Play>\n", xml_escape(url)));
            }
            Verb::Gather {
                action,
                timeout_secs,
                speech_timeout_secs,
                language,
                prompt,
            } => {
                xml.push_str(&format!(
                    "{indent}<Gather input=\"speech\" timeout=\"{}\" speechTimeout=\"{}\" action=\"{}\" method=\"POST\"",
                    timeout_secs,
                    speech_timeout_secs,
                    xml_escape(action),
                ));
                if let Some(language) = language {
                    xml.push_str(&format!(" language=\"{}\"", xml_escape(language)));
                }
                if prompt.is_empty() {
                    xml.push_str("/>\n");
                } else {
                    xml.push_str(">\n");
                    for verb in prompt {
                        verb.render_into(xml, depth + 1);
                    }
                    xml.push_str(&format!("{indent}</Gather>\n"));
                }
            }
            Verb::Hangup => {
                xml.push_str(&format!("{indent}<Hangup/>\n"));
            }
        }
    }
}

/// A complete TwiML response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallControlDocument {
    verbs: Vec<Verb>,
}

impl CallControlDocument {
    pub fn new(verbs: Vec<Verb>) -> Self {
        Self { verbs }
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// Top-level verb names in order, e.g. `["Play", "Gather", "Say", "Hangup"]`.
    pub fn outline(&self) -> Vec<&'static str> {
        self.verbs.iter().map(Verb::name).collect()
    }

    /// Whether the document ends by hanging up.
    pub fn ends_with_hangup(&self) -> bool {
        matches!(self.verbs.last(), Some(Verb::Hangup))
    }

    /// Text of every `<Say>`, nested prompts included.
    pub fn spoken_lines(&self) -> Vec<&str> {
        fn collect<'a>(verbs: &'a [Verb], lines: &mut Vec<&'a str>) {
            for verb in verbs {
                match verb {
                    Verb::Say { text, .. } => lines.push(text),
                    Verb::Gather { prompt, .. } => collect(prompt, lines),
                    _ => {}
                }
            }
        }
        let mut lines = Vec::new();
        collect(&self.verbs, &mut lines);
        lines
    }

    pub fn render(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n");
        for verb in &self.verbs {
            verb.render_into(&mut xml, 1);
        }
        xml.push_str("</Response>");
        xml
    }
}

impl fmt::Display for CallControlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// What the caller hears first in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    /// Spoken by the telephony provider's built-in voice
    Speak(String),
    /// Hosted audio at a fetchable URL
    Play(String),
}

/// What happens after the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep<'a> {
    /// Open a capture window with a spoken prompt; `closing` is said if it times out.
    Listen { prompt: &'a str, closing: &'a str },
    /// The utterance is the last line of the call.
    HangUp,
}

/// Builds documents for one webhook route.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    action_url: String,
    voice: String,
    language: Option<String>,
    capture: CaptureWindow,
}

impl ResponseBuilder {
    /// `action_url` is the route's own public URL; gathered speech is posted back to it.
    pub fn new(action_url: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            action_url: action_url.into(),
            voice: voice.into(),
            language: None,
            capture: CaptureWindow::default(),
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_capture_window(mut self, capture: CaptureWindow) -> Self {
        self.capture = capture;
        self
    }

    pub fn build(&self, utterance: &Utterance, next: NextStep<'_>) -> CallControlDocument {
        let mut verbs = vec![match utterance {
            Utterance::Speak(text) => self.say(text),
            Utterance::Play(url) => Verb::Play { url: url.clone() },
        }];

        if let NextStep::Listen { prompt, closing } = next {
            verbs.push(Verb::Gather {
                action: self.action_url.clone(),
                timeout_secs: self.capture.timeout_secs,
                speech_timeout_secs: self.capture.speech_timeout_secs,
                language: self.language.clone(),
                prompt: vec![self.say(prompt)],
            });
            verbs.push(self.say(closing));
        }

        verbs.push(Verb::Hangup);
        CallControlDocument::new(verbs)
    }

    /// Say one line and end the call.
    pub fn say_and_hang_up(&self, line: &str) -> CallControlDocument {
        self.build(&Utterance::Speak(line.to_string()), NextStep::HangUp)
    }

    fn say(&self, text: &str) -> Verb {
        Verb::Say {
            text: text.to_string(),
            voice: self.voice.clone(),
            language: self.language.clone(),
        }
    }
}

/// Escape the five XML special characters.
pub fn xml_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
