use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{Aig, AigEdge, AigNodeKind, FaninId, NodeId, Result, aig::error::ParserError};

type ParseResult<T> = std::result::Result<T, ParserError>;

fn read_u64(s: &str, line: usize, expected: &'static str) -> ParseResult<u64> {
    s.parse::<u64>().map_err(|_| ParserError::InvalidToken {
        line,
        token: s.to_string(),
        expected,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    m: u64,
    i: u64,
    o: u64,
    a: u64,
}

impl Header {
    /// Number of arena slots needed: the constant, M variables and O outputs.
    fn num_slots(&self) -> NodeId {
        (self.m + self.o) as NodeId + 1
    }

    /// Largest literal allowed in the body.
    fn max_literal(&self) -> u64 {
        2 * self.m + 1
    }
}

impl TryFrom<&str> for Header {
    type Error = ParserError;

    fn try_from(line: &str) -> ParseResult<Self> {
        let tokens = line.split_whitespace().collect::<Vec<&str>>();

        match tokens.first() {
            None => {
                return Err(ParserError::InvalidHeader {
                    line: 1,
                    reason: "empty header".to_string(),
                });
            }
            Some(&"aig") => {
                return Err(ParserError::UnsupportedFeature {
                    line: 1,
                    feature: "binary AIGER".to_string(),
                });
            }
            Some(&"aag") => (),
            Some(tag) => {
                return Err(ParserError::InvalidToken {
                    line: 1,
                    token: tag.to_string(),
                    expected: "aag",
                });
            }
        }

        if tokens.len() != 6 {
            return Err(ParserError::InvalidHeader {
                line: 1,
                reason: format!("expected aag M I L O A, got {} numbers", tokens.len() - 1),
            });
        }

        let m = read_u64(tokens[1], 1, "M")?;
        let i = read_u64(tokens[2], 1, "I")?;
        let l = read_u64(tokens[3], 1, "L")?;
        let o = read_u64(tokens[4], 1, "O")?;
        let a = read_u64(tokens[5], 1, "A")?;

        if l != 0 {
            return Err(ParserError::UnsupportedFeature {
                line: 1,
                feature: format!("{} latches", l),
            });
        }
        let too_large = |what: &str| ParserError::InvalidHeader {
            line: 1,
            reason: format!("{} is too large", what),
        };
        let defined = i.checked_add(a).ok_or_else(|| too_large("I + A"))?;
        if m < defined {
            return Err(ParserError::InvalidHeader {
                line: 1,
                reason: format!("M={} is smaller than I + A = {}", m, defined),
            });
        }
        // Literals go up to 2M + 1, output ids up to M + O
        m.checked_mul(2)
            .and_then(|x| x.checked_add(1))
            .ok_or_else(|| too_large("M"))?;
        m.checked_add(o)
            .and_then(|x| NodeId::try_from(x).ok())
            .and_then(|x| x.checked_add(1))
            .ok_or_else(|| too_large("M + O"))?;

        Ok(Header { m, i, o, a })
    }
}

/// Numbered lines of the input.
struct Lines<R> {
    inner: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Lines {
            inner: reader.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self) -> ParseResult<Option<String>> {
        match self.inner.next() {
            None => Ok(None),
            Some(res) => {
                self.line += 1;
                res.map(Some)
                    .map_err(|e| ParserError::IoError(e.to_string()))
            }
        }
    }

    /// The next line, that must hold a `what` definition.
    fn expect_line(&mut self, what: &'static str) -> ParseResult<String> {
        self.next_line()?.ok_or(ParserError::MissingDefinition {
            line: self.line + 1,
            what,
        })
    }
}

fn read_literal(token: &str, line: usize, header: &Header) -> ParseResult<u64> {
    let literal = read_u64(token, line, "literal")?;
    if literal > header.max_literal() {
        return Err(ParserError::LiteralOutOfRange {
            line,
            literal,
            max_id: header.m,
        });
    }
    Ok(literal)
}

/// A literal defining a variable: even, and not the constant.
fn read_definition(token: &str, line: usize, header: &Header) -> ParseResult<NodeId> {
    let literal = read_literal(token, line, header)?;
    if literal < 2 {
        return Err(ParserError::RedefinedConst { line, literal });
    }
    if literal & 1 == 1 {
        return Err(ParserError::CannotInvert { line, literal });
    }
    Ok((literal >> 1) as NodeId)
}

fn read_tokens<'a>(
    s: &'a str,
    n: usize,
    line: usize,
    what: &'static str,
) -> ParseResult<Vec<&'a str>> {
    let tokens = s.split_whitespace().collect::<Vec<&str>>();
    if tokens.len() < n {
        return Err(ParserError::MissingDefinition { line, what });
    }
    if tokens.len() > n {
        return Err(ParserError::InvalidToken {
            line,
            token: tokens[n].to_string(),
            expected: "end of line",
        });
    }
    Ok(tokens)
}

fn read_input(s: &str, line: usize, header: &Header) -> ParseResult<NodeId> {
    let tokens = read_tokens(s, 1, line, "PI")?;
    read_definition(tokens[0], line, header)
}

fn read_output(s: &str, line: usize, header: &Header) -> ParseResult<AigEdge> {
    let tokens = read_tokens(s, 1, line, "PO")?;
    Ok(AigEdge::from_literal(read_literal(tokens[0], line, header)?))
}

fn read_and(s: &str, line: usize, header: &Header) -> ParseResult<(NodeId, AigEdge, AigEdge)> {
    let tokens = read_tokens(s, 3, line, "AIG")?;
    let id = read_definition(tokens[0], line, header)?;
    let fanin0 = AigEdge::from_literal(read_literal(tokens[1], line, header)?);
    let fanin1 = AigEdge::from_literal(read_literal(tokens[2], line, header)?);
    Ok((id, fanin0, fanin1))
}

/// Reports the redefinition of `id` if some gate already uses it.
fn check_fresh(aig: &Aig, id: NodeId, line: usize) -> ParseResult<()> {
    match aig.get_node(id) {
        Some(previous) => Err(ParserError::Redefinition {
            line,
            literal: 2 * id as u64,
            kind: previous.get_kind().to_string(),
            previous_line: previous.get_line(),
        }),
        None => Ok(()),
    }
}

/// Reads `i<k> name` and `o<k> name` lines until `c` or the end of the file.
fn read_symbols<R: BufRead>(aig: &mut Aig, lines: &mut Lines<R>) -> Result<()> {
    while let Some(s) = lines.next_line()? {
        let s = s.trim_end_matches('\r');
        let line = lines.line;
        if s == "c" || s.is_empty() {
            break;
        }
        let (kind, ids) = match s.chars().next() {
            Some('i') => ('i', aig.get_inputs().to_vec()),
            Some('o') => ('o', aig.get_outputs().to_vec()),
            _ => {
                return Err(ParserError::InvalidToken {
                    line,
                    token: s.to_string(),
                    expected: "symbol (i<k> name, o<k> name) or comment",
                }
                .into());
            }
        };
        let Some((index, name)) = s[1..].split_once(' ') else {
            return Err(ParserError::MissingDefinition {
                line,
                what: "symbol name",
            }
            .into());
        };
        let index = read_u64(index, line, "symbol index")? as usize;
        if name.is_empty() {
            return Err(ParserError::MissingDefinition {
                line,
                what: "symbol name",
            }
            .into());
        }
        let &id = ids.get(index).ok_or(ParserError::SymbolOutOfRange {
            line,
            kind,
            index,
            count: ids.len(),
        })?;
        if aig.node(id)?.get_name().is_some() {
            return Err(ParserError::RedefinedSymbol { line, kind, index }.into());
        }
        aig.set_name(id, name)?;
    }
    Ok(())
}

impl Aig {
    /// Creates an AIG from a reader over the ASCII AIGER format (`aag`).
    ///
    /// Literals that are used but never defined become [`AigNodeKind::Undefined`] gates.
    /// Output gates get ids `M + 1` to `M + O`. On failure, nothing is returned:
    /// the error carries the line and the offending value.
    pub fn from_ascii(reader: impl BufRead) -> Result<Self> {
        let mut lines = Lines::new(reader);
        let header = Header::try_from(lines.expect_line("header")?.as_str())?;

        let mut aig = Aig::new();
        aig.reserve(header.num_slots())
            .map_err(|_| ParserError::InvalidHeader {
                line: 1,
                reason: format!("cannot allocate {} gates", header.num_slots()),
            })?;
        aig.set_max_var(header.m as NodeId);

        for _ in 0..header.i {
            let s = lines.expect_line("PI")?;
            let line = lines.line;
            let id = read_input(&s, line, &header)?;
            check_fresh(&aig, id, line)?;
            aig.add_node_at_line(id, AigNodeKind::Input, line)?;
        }

        let mut outputs = Vec::new();
        for _ in 0..header.o {
            let s = lines.expect_line("PO")?;
            outputs.push((read_output(&s, lines.line, &header)?, lines.line));
        }

        // First step: add and nodes with dummy edges to node false
        let dummy = AigEdge::new(0, false);
        let mut ands = Vec::new();
        for _ in 0..header.a {
            let s = lines.expect_line("AIG")?;
            let line = lines.line;
            let (id, fanin0, fanin1) = read_and(&s, line, &header)?;
            check_fresh(&aig, id, line)?;
            aig.add_node_at_line(
                id,
                AigNodeKind::And {
                    fanin0: dummy,
                    fanin1: dummy,
                },
                line,
            )?;
            ands.push((id, fanin0, fanin1));
        }

        // Placeholders for what is used but never defined
        let used = ands
            .iter()
            .flat_map(|(_, f0, f1)| [f0.node, f1.node])
            .chain(outputs.iter().map(|(f, _)| f.node));
        for id in used.collect::<Vec<_>>() {
            if aig.get_node(id).is_none() {
                aig.add_node(id, AigNodeKind::Undefined)?;
            }
        }

        // Then replace with real edges
        for (id, fanin0, fanin1) in ands {
            aig.rewire_fanin(id, FaninId::Fanin0, fanin0)?;
            aig.rewire_fanin(id, FaninId::Fanin1, fanin1)?;
        }

        for (k, (fanin, line)) in outputs.into_iter().enumerate() {
            let id = header.m as NodeId + k + 1;
            aig.add_node_at_line(id, AigNodeKind::Output { fanin }, line)?;
        }

        read_symbols(&mut aig, &mut lines)?;

        // Is the AIG okay?
        aig.check_integrity()?;

        Ok(aig)
    }

    /// Creates an AIG from an .aag file using the ASCII AIGER format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("aag") => {
                let f =
                    File::open(path.as_ref()).map_err(|z| ParserError::IoError(z.to_string()))?;
                Aig::from_ascii(BufReader::new(f))
            }
            _ => Err(ParserError::IoError("invalid extension, expected .aag".to_string()).into()),
        }
    }
}
