/// Split a string into chunks of text separated by whitespace with the offset before each chunk
/// returned for nice error generation.
pub fn split_ascii_whitespace(input: &str) -> Vec<(usize, &str)> {
    let mut index = input.chars().take_while(char::is_ascii_whitespace).count();
    let mut chunks = Vec::new();
    while index < input.len() {
        let chunk_len = input[index..]
            .chars()
            .take_while(|c| !c.is_ascii_whitespace())
            .count();
        chunks.push((index, &input[index..index + chunk_len]));
        index += chunk_len;
        index += input[index..]
            .chars()
            .take_while(char::is_ascii_whitespace)
            .count();
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_runs_of_whitespace() {
        let chunks = split_ascii_whitespace("  1wzaA02   1zjaA02  86.25");
        assert_eq!(
            chunks,
            vec![(2, "1wzaA02"), (13, "1zjaA02"), (23, "86.25")]
        );
    }
}
