//! Fixed lines spoken during a call.
//!
//! Every sentence the gateway can say on its own (greetings, capture prompts,
//! closing remarks, apologies) lives in [`CallScript`]. The defaults are the
//! Swedish Autocaller script; any subset can be overridden from the `script:`
//! section of the YAML configuration.

use serde::Deserialize;

/// System prompt establishing the sales persona for the dialogue model.
pub const DEFAULT_PERSONA: &str = "You are Emma, a friendly sales agent calling on behalf of Autocaller. \
You speak Swedish and English fluently.

How you behave:
- Warm, professional and conversational
- Answer in the language the customer uses (Swedish or English)
- Greet the lead by first name when you know it
- Ask qualifying questions about their business needs
- Handle objections politely
- Keep every answer short, one or two sentences, since this is a phone call
- Close with an invitation to book a meeting

Your goal is to qualify leads for Autocaller's automated calling solutions and book meetings. \
If the customer sounds uninterested, try to understand their concerns. \
If they sound interested, ask about their business and how they handle calls today.";

/// Lines used by the turn strategies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CallScript {
    /// System prompt for the dialogue model
    pub persona: String,

    pub greeting: String,
    pub greeting_prompt: String,
    pub greeting_closing: String,

    /// Prompt and closing after a hosted-audio reply
    pub reply_prompt: String,
    pub reply_closing: String,

    /// Prompt and closing after a reply spoken with the provider voice
    pub fallback_prompt: String,
    pub fallback_closing: String,

    /// Transcript used when the caller's words could not be recovered
    pub not_understood: String,
    /// Reply used when the dialogue model returns no content
    pub empty_reply: String,

    pub technical_problem: String,
    pub not_configured: String,
    pub default_farewell: String,
    pub unexpected_error: String,

    pub echo_greeting: String,
    pub echo_greeting_prompt: String,
    pub echo_greeting_closing: String,
    /// Prefix placed before the repeated caller speech
    pub echo_reply_prefix: String,
    pub echo_prompt: String,
    pub echo_closing: String,
    pub echo_farewell: String,
}

impl Default for CallScript {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            greeting: "Hej! Jag heter Emma och ringer från Autocaller. Hur mår du idag?".to_string(),
            greeting_prompt: "Säg något så kan vi prata.".to_string(),
            greeting_closing: "Jag hörde inget svar. Ha en bra dag!".to_string(),
            reply_prompt: "Vad tycker du?".to_string(),
            reply_closing: "Tack så mycket för ditt intresse. Vi hörs snart igen!".to_string(),
            fallback_prompt: "Vad tycker du om det?".to_string(),
            fallback_closing: "Tack för ditt intresse. Ha en bra dag!".to_string(),
            not_understood: "Jag förstod inte vad du sa".to_string(),
            empty_reply: "Förlåt, jag förstod inte riktigt. Kan du upprepa det?".to_string(),
            technical_problem:
                "Förlåt, jag har tekniska problem just nu. Tack för ditt intresse och ha en bra dag!"
                    .to_string(),
            not_configured:
                "Hej! Tyvärr är AI-systemet inte konfigurerat korrekt. Kontakta support."
                    .to_string(),
            default_farewell: "Hej! Tack för att du svarade. Ha en bra dag!".to_string(),
            unexpected_error: "Ett tekniskt fel uppstod. Vi ber om ursäkt. Ha en bra dag!"
                .to_string(),
            echo_greeting:
                "Hej! Det här är ett test av Autocaller webhook. Säg något så kan jag upprepa det."
                    .to_string(),
            echo_greeting_prompt: "Säg något nu.".to_string(),
            echo_greeting_closing: "Jag hörde inget svar. Tack och hej då!".to_string(),
            echo_reply_prefix: "Hej! Jag hörde:".to_string(),
            echo_prompt: "Säg något mer om du vill.".to_string(),
            echo_closing: "Tack för testet! Ha en bra dag!".to_string(),
            echo_farewell: "Hej! Webhook test fungerar. Ha en bra dag!".to_string(),
        }
    }
}

impl CallScript {
    /// Line repeating what the caller said, for the echo strategy.
    pub fn echo_reply(&self, speech: &str) -> String {
        format!("{} {}", self.echo_reply_prefix, speech.trim())
    }
}
