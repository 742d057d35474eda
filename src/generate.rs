//! Random values of the JSON subset and random renderings of them.

use crate::json::JsonValue;
use rand::seq::SliceRandom;
use rand::Rng;

const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'x', 'y', 'z', 'A', 'Z', '0', '9', ' ', '\t', '[', ']', ',', ':', '{', '}', 'é',
    'ß', '✓',
];
const WHITESPACE: &[char] = &[' ', '\n', '\t', '\r'];

/// A random value. Arrays nest at most `depth` levels.
pub fn value<R: Rng + ?Sized>(random: &mut R, depth: usize) -> JsonValue {
    let choice = if depth == 0 {
        random.gen_range(0..2)
    } else {
        random.gen_range(0..3)
    };
    match choice {
        0 => JsonValue::Number(random.gen::<u32>() as f64),
        1 => {
            let length = random.gen_range(0..8);
            JsonValue::Text(
                (0..length)
                    .filter_map(|_| ALPHABET.choose(random).copied())
                    .collect(),
            )
        }
        _ => {
            let length = random.gen_range(0..5);
            JsonValue::Array((0..length).map(|_| value(random, depth - 1)).collect())
        }
    }
}

/// Renders `value` with random whitespace wherever the grammar allows it.
pub fn text<R: Rng + ?Sized>(random: &mut R, value: &JsonValue) -> String {
    let mut text = String::new();
    space(random, &mut text);
    write(random, value, &mut text);
    space(random, &mut text);
    text
}

fn write<R: Rng + ?Sized>(random: &mut R, value: &JsonValue, text: &mut String) {
    match value {
        JsonValue::Array(values) => {
            text.push('[');
            space(random, text);
            for (index, value) in values.iter().enumerate() {
                if index > 0 {
                    space(random, text);
                    text.push(',');
                    space(random, text);
                }
                write(random, value, text);
            }
            space(random, text);
            text.push(']');
        }
        value => text.push_str(&value.to_string()),
    }
}

fn space<R: Rng + ?Sized>(random: &mut R, text: &mut String) {
    for _ in 0..random.gen_range(0..3) {
        if let Some(character) = WHITESPACE.choose(random) {
            text.push(*character);
        }
    }
}
