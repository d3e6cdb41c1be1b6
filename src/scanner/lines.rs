/// Iterator over the lines of a string, split on CR, LF, and CR LF.
///
/// Each line keeps its terminator so that the unscanned remainder of the
/// input can be reassembled verbatim. Other Unicode line separators are not
/// recognized.
///
/// ```
/// use headerparser::Lines;
/// let lines: Vec<_> = Lines::new("a\r\nb\rc\nd").collect();
/// assert_eq!(lines, vec!["a\r\n", "b\r", "c\n", "d"]);
/// ```
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Lines<'a> {
    pub fn new(text: &'a str) -> Self {
        Lines { rest: text }
    }

    /// The text that has not been split off yet
    pub fn remainder(&self) -> &'a str {
        self.rest
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let data = self.rest.as_bytes();
        let end = match data.iter().position(|&x| x == b'\r' || x == b'\n') {
            Some(i) if data[i] == b'\r' && data.get(i + 1) == Some(&b'\n') => i + 2,
            Some(i) => i + 1,
            None => data.len(),
        };

        let (line, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(line)
    }
}
