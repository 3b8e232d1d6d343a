// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Pseudo-locales stress-test layouts without real translations: en-XA
// accents and expands every string, ar-XB wraps them in right-to-left
// controls. Both are derived from the parsed defaults, never from the
// source document.
use resc_common::*;

use crate::{
    config::ConfigDescription,
    table::{Item, ResourceTable, Value}
};

#[derive(Clone, Copy)]
enum Method {
    Accent,
    Bidi
}

/// Synthesizes `en-XA` and `ar-XB` variants of every translatable string
/// and plural in the default configuration. Variants are inserted weak, so
/// an explicit value for either locale always wins.
pub fn pseudolocalize_table(table: &mut ResourceTable) -> Result<()> {
    let mut synthesized = vec![];
    for package in &table.packages {
        for res_type in &package.types {
            if res_type.name != "string" && res_type.name != "plurals" {
                continue;
            }
            for entry in &res_type.entries {
                for config_value in &entry.values {
                    if !config_value.config.is_default() || config_value.weak {
                        continue;
                    }
                    for (method, language, region) in
                        [(Method::Accent, "en", "XA"), (Method::Bidi, "ar", "XB")]
                    {
                        if let Some(value) = pseudolocalize_value(&config_value.value, method)
                        {
                            synthesized.push((
                                package.name.clone(),
                                res_type.name.clone(),
                                entry.name.clone(),
                                ConfigDescription::for_locale(language, region),
                                value
                            ));
                        }
                    }
                }
            }
        }
    }

    for (package, type_name, entry_name, config, value) in synthesized {
        table.insert(&package, &type_name, &entry_name, config, true, value)?;
    }
    Ok(())
}

fn pseudolocalize_value(value: &Value, method: Method) -> Option<Value> {
    match value {
        Value::Item(Item::Str {
            value,
            translatable: true
        }) => Some(Value::Item(Item::Str {
            value: transform(value, method),
            translatable: true
        })),
        Value::Plurals(entries) => {
            let mut transformed_any = false;
            let transformed = entries
                .iter()
                .map(|(arity, item)| match item {
                    Item::Str {
                        value,
                        translatable: true
                    } => {
                        transformed_any = true;
                        (
                            *arity,
                            Item::Str {
                                value: transform(value, method),
                                translatable: true
                            }
                        )
                    }
                    other => (*arity, other.clone())
                })
                .collect();
            transformed_any.then_some(Value::Plurals(transformed))
        }
        _ => None
    }
}

fn transform(text: &str, method: Method) -> String {
    match method {
        Method::Accent => accent_and_expand(text),
        Method::Bidi => rtl_wrap(text)
    }
}

const EXPANSION_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"
];

/// `Hello %s` becomes `[Ĥéļļö %s one two]`: accented characters, format
/// specifiers preserved, and ~50% padding so truncation shows up in test
/// runs.
fn accent_and_expand(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::from("[");
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%' {
            // Copy the whole specifier untouched, `%%` included
            out.push('%');
            i += 1;
            while i < chars.len() {
                let c = chars[i];
                out.push(c);
                i += 1;
                if c == '%' || c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(accent_char(chars[i]));
        i += 1;
    }

    let needed = (chars.len() + 1) / 2;
    let mut appended = 0;
    let mut word_idx = 0;
    while appended < needed {
        let word = EXPANSION_WORDS[word_idx % EXPANSION_WORDS.len()];
        out.push(' ');
        out.push_str(word);
        appended += word.len() + 1;
        word_idx += 1;
    }
    out.push(']');
    out
}

fn rtl_wrap(text: &str) -> String {
    format!("\u{200F}\u{202E}{text}\u{202C}\u{200F}")
}

fn accent_char(c: char) -> char {
    match c {
        'a' => 'å',
        'b' => 'ƀ',
        'c' => 'ç',
        'd' => 'ð',
        'e' => 'é',
        'f' => 'ƒ',
        'g' => 'ĝ',
        'h' => 'ĥ',
        'i' => 'î',
        'j' => 'ĵ',
        'k' => 'ķ',
        'l' => 'ļ',
        'm' => 'ɱ',
        'n' => 'ñ',
        'o' => 'ö',
        'p' => 'þ',
        'q' => 'ǫ',
        'r' => 'ŕ',
        's' => 'š',
        't' => 'ţ',
        'u' => 'û',
        'v' => 'ṽ',
        'w' => 'ŵ',
        'x' => 'ẋ',
        'y' => 'ý',
        'z' => 'ž',
        'A' => 'Å',
        'B' => 'Ɓ',
        'C' => 'Ç',
        'D' => 'Ð',
        'E' => 'É',
        'F' => 'Ƒ',
        'G' => 'Ĝ',
        'H' => 'Ĥ',
        'I' => 'Î',
        'J' => 'Ĵ',
        'K' => 'Ķ',
        'L' => 'Ļ',
        'M' => 'Ṁ',
        'N' => 'Ñ',
        'O' => 'Ö',
        'P' => 'Þ',
        'Q' => 'Ǫ',
        'R' => 'Ŕ',
        'S' => 'Š',
        'T' => 'Ţ',
        'U' => 'Û',
        'V' => 'Ṽ',
        'W' => 'Ŵ',
        'X' => 'Ẋ',
        'Y' => 'Ý',
        'Z' => 'Ž',
        other => other
    }
}
