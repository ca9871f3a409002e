//! Flattening of bracketed parse-tree lines back to surface text.
//!
//! Annotated dumps encode sentence content as Penn-Treebank-style bracket
//! trees, e.g. `(S (NP (DT The) (NN cat)) (VP (VBD sat)))`. Downstream only
//! the surface text is needed, so a tree line is reduced to its yield: the
//! leaf tokens in order, joined with single spaces. The tree structure is
//! deliberately lost.

/// Compute the yield (flat token text) of a bracketed tree line.
///
/// A leaf is any token that sits directly before a closing paren. PTB
/// bracket escapes are decoded so the surface text reads naturally.
pub fn tree_yield(line: &str) -> String {
    let tokens = tokenize(line);
    let mut words = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token == "(" || token == ")" {
            continue;
        }
        if tokens.get(i + 1).map(String::as_str) == Some(")") {
            words.push(unescape(token));
        }
    }
    words.join(" ")
}

fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in line.chars() {
        match ch {
            '(' | ')' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn unescape(token: &str) -> String {
    match token {
        "-LRB-" => "(".to_string(),
        "-RRB-" => ")".to_string(),
        "-LSB-" => "[".to_string(),
        "-RSB-" => "]".to_string(),
        "-LCB-" => "{".to_string(),
        "-RCB-" => "}".to_string(),
        other => other.to_string(),
    }
}
