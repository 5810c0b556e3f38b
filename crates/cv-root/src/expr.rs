//! Expression engine for draw expressions and cuts over tree branches.
//!
//! Supports arithmetic (`+ - * / %`), comparisons (`== != < <= > >=`),
//! boolean operators (`&& || !`) and the functions `abs sqrt log log10 exp
//! pow min max sin cos tan atan2`, also spelled the `TMath::` way
//! (`TMath::Abs`, `TMath::Power`, ...). Identifiers are branch names and may
//! contain dots or a fixed-array index suffix (`pos[1]`).

use crate::error::{Result, RootError};

// ── AST ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Expr {
    Number(f64),
    Var(usize), // index into required_branches
    UnaryNeg(Box<Expr>),
    UnaryNot(Box<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

#[derive(Debug, Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy)]
enum Func {
    Abs,
    Sqrt,
    Log,
    Log10,
    Exp,
    Pow,
    Min,
    Max,
    Sin,
    Cos,
    Tan,
    Atan2,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        let f = match name {
            "abs" | "fabs" | "TMath::Abs" => Func::Abs,
            "sqrt" | "TMath::Sqrt" => Func::Sqrt,
            "log" | "TMath::Log" => Func::Log,
            "log10" | "TMath::Log10" => Func::Log10,
            "exp" | "TMath::Exp" => Func::Exp,
            "pow" | "TMath::Power" => Func::Pow,
            "min" | "TMath::Min" => Func::Min,
            "max" | "TMath::Max" => Func::Max,
            "sin" | "TMath::Sin" => Func::Sin,
            "cos" | "TMath::Cos" => Func::Cos,
            "tan" | "TMath::Tan" => Func::Tan,
            "atan2" | "TMath::ATan2" => Func::Atan2,
            _ => return None,
        };
        Some(f)
    }

    fn arity(self) -> usize {
        match self {
            Func::Pow | Func::Min | Func::Max | Func::Atan2 => 2,
            _ => 1,
        }
    }
}

// ── Compiled expression ────────────────────────────────────────

/// A compiled expression ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledExpr {
    ast: Expr,
    /// Branch names referenced by this expression, by first occurrence.
    pub required_branches: Vec<String>,
}

impl CompiledExpr {
    /// Parse and compile an expression string.
    pub fn compile(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(RootError::Expression("empty expression".into()));
        }
        let mut parser = Parser::new(&tokens);
        let ast = parser.parse_or()?;
        if parser.pos < parser.tokens.len() {
            return Err(RootError::Expression(format!(
                "unexpected token after expression: {:?}",
                parser.tokens[parser.pos]
            )));
        }
        let branches = std::mem::take(&mut parser.branches);
        Ok(CompiledExpr { ast, required_branches: branches })
    }

    /// Evaluate for a single row; `values` follows `required_branches`.
    pub fn eval_row(&self, values: &[f64]) -> f64 {
        eval_expr(&self.ast, values)
    }

    /// Evaluate for `n_rows` rows column-wise.
    ///
    /// `columns` follows `required_branches`; each column holds `n_rows`
    /// values. A constant expression is broadcast to every row.
    pub fn eval_bulk(&self, columns: &[&[f64]], n_rows: usize) -> Vec<f64> {
        if columns.is_empty() {
            return vec![eval_expr(&self.ast, &[]); n_rows];
        }
        let mut row = vec![0.0f64; columns.len()];
        let mut out = Vec::with_capacity(n_rows);
        for i in 0..n_rows {
            for (j, col) in columns.iter().enumerate() {
                row[j] = col[i];
            }
            out.push(eval_expr(&self.ast, &row));
        }
        out
    }
}

/// Split a `TTree::Draw` variable expression on its top-level colons.
///
/// `"y:x"` gives `["y", "x"]`. Colons inside parentheses or brackets and the
/// `::` scope operator do not split.
pub fn split_varexp(varexp: &str) -> Vec<&str> {
    let bytes = varexp.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
                continue;
            }
            b':' if depth == 0 => {
                parts.push(varexp[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(varexp[start..].trim());
    parts
}

// ── Evaluation ─────────────────────────────────────────────────

#[inline]
fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// `%` truncates both operands to integers first, as `TTree::Draw` does.
/// A divisor that truncates to zero, or a non-finite operand, gives NaN.
fn int_rem(lhs: f64, rhs: f64) -> f64 {
    if !lhs.is_finite() || !rhs.is_finite() {
        return f64::NAN;
    }
    (lhs as i64).checked_rem(rhs as i64).map_or(f64::NAN, |r| r as f64)
}

fn eval_expr(e: &Expr, vals: &[f64]) -> f64 {
    match e {
        Expr::Number(n) => *n,
        Expr::Var(i) => vals[*i],
        Expr::UnaryNeg(a) => -eval_expr(a, vals),
        Expr::UnaryNot(a) => truth(eval_expr(a, vals) <= 0.0),
        Expr::BinOp(op, a, b) => {
            let lhs = eval_expr(a, vals);
            let rhs = eval_expr(b, vals);
            match op {
                BinOp::Add => lhs + rhs,
                BinOp::Sub => lhs - rhs,
                BinOp::Mul => lhs * rhs,
                BinOp::Div => lhs / rhs,
                BinOp::Rem => int_rem(lhs, rhs),
                BinOp::Eq => truth((lhs - rhs).abs() < f64::EPSILON),
                BinOp::Ne => truth((lhs - rhs).abs() >= f64::EPSILON),
                BinOp::Lt => truth(lhs < rhs),
                BinOp::Le => truth(lhs <= rhs),
                BinOp::Gt => truth(lhs > rhs),
                BinOp::Ge => truth(lhs >= rhs),
                BinOp::And => truth(lhs > 0.0 && rhs > 0.0),
                BinOp::Or => truth(lhs > 0.0 || rhs > 0.0),
            }
        }
        Expr::Call(f, args) => {
            let a0 = || eval_expr(&args[0], vals);
            let a1 = || eval_expr(&args[1], vals);
            match f {
                Func::Abs => a0().abs(),
                Func::Sqrt => a0().sqrt(),
                Func::Log => a0().ln(),
                Func::Log10 => a0().log10(),
                Func::Exp => a0().exp(),
                Func::Pow => a0().powf(a1()),
                Func::Min => a0().min(a1()),
                Func::Max => a0().max(a1()),
                Func::Sin => a0().sin(),
                Func::Cos => a0().cos(),
                Func::Tan => a0().tan(),
                Func::Atan2 => a0().atan2(a1()),
            }
        }
    }
}

// ── Tokenizer ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if let Some(&next) = chars.get(i + 1) {
            let tok = match (c, next) {
                ('&', '&') => Some(Token::And),
                ('|', '|') => Some(Token::Or),
                ('=', '=') => Some(Token::Eq),
                ('!', '=') => Some(Token::Ne),
                ('<', '=') => Some(Token::Le),
                ('>', '=') => Some(Token::Ge),
                _ => None,
            };
            if let Some(t) = tok {
                tokens.push(t);
                i += 2;
                continue;
            }
        }

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '%' => Some(Token::Percent),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            '<' => Some(Token::Lt),
            '>' => Some(Token::Gt),
            '!' => Some(Token::Not),
            _ => None,
        };
        if let Some(t) = single {
            tokens.push(t);
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_ascii_digit()
                    || chars[i] == '.'
                    || chars[i] == 'e'
                    || chars[i] == 'E'
                    || ((chars[i] == '+' || chars[i] == '-')
                        && i > start
                        && (chars[i - 1] == 'e' || chars[i - 1] == 'E')))
            {
                i += 1;
            }
            let s: String = chars[start..i].iter().collect();
            let n: f64 = s
                .parse()
                .map_err(|_| RootError::Expression(format!("invalid number: '{s}'")))?;
            tokens.push(Token::Num(n));
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            while i < chars.len() {
                let ch = chars[i];
                if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                    i += 1;
                } else if ch == ':'
                    && chars.get(i + 1) == Some(&':')
                    && chars.get(i + 2).is_some_and(|&n| is_ident_start(n))
                {
                    i += 2;
                } else {
                    break;
                }
            }
            // fixed-array index: name[3]
            if chars.get(i) == Some(&'[') {
                let close = chars[i..].iter().position(|&ch| ch == ']').map(|p| i + p);
                match close {
                    Some(end) if end > i + 1 && chars[i + 1..end].iter().all(|d| d.is_ascii_digit()) => {
                        i = end + 1;
                    }
                    _ => {
                        return Err(RootError::Expression(format!(
                            "array index must be a non-negative integer at position {i}"
                        )));
                    }
                }
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        return Err(RootError::Expression(format!("unexpected character: '{c}'")));
    }

    Ok(tokens)
}

// ── Parser (recursive descent) ─────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    branches: Vec<String>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0, branches: Vec::new() }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.advance() {
            Some(t) if t == expected => Ok(()),
            other => Err(RootError::Expression(format!("expected {expected:?}, got {other:?}"))),
        }
    }

    fn resolve_var(&mut self, name: &str) -> usize {
        if let Some(i) = self.branches.iter().position(|b| b == name) {
            i
        } else {
            self.branches.push(name.to_string());
            self.branches.len() - 1
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::BinOp(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_cmp()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            let rhs = self.parse_cmp()?;
            lhs = Expr::BinOp(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_cmp(&mut self) -> Result<Expr> {
        let lhs = self.parse_add()?;
        let op = match self.peek() {
            Some(Token::Eq) => BinOp::Eq,
            Some(Token::Ne) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_add()?;
        Ok(Expr::BinOp(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_add(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = Expr::BinOp(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::BinOp(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                let e = self.parse_unary()?;
                Ok(Expr::UnaryNeg(Box::new(e)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary()
            }
            Some(Token::Not) => {
                self.advance();
                let e = self.parse_unary()?;
                Ok(Expr::UnaryNot(Box::new(e)))
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.advance().cloned() {
            Some(Token::Num(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let e = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(e)
            }
            Some(Token::Ident(name)) => {
                if !matches!(self.peek(), Some(Token::LParen)) {
                    return Ok(Expr::Var(self.resolve_var(&name)));
                }
                self.advance();
                let func = Func::lookup(&name).ok_or_else(|| {
                    RootError::Expression(format!("unknown function: '{name}'"))
                })?;
                let mut args = vec![self.parse_or()?];
                while matches!(self.peek(), Some(Token::Comma)) {
                    self.advance();
                    args.push(self.parse_or()?);
                }
                self.expect(&Token::RParen)?;
                if args.len() != func.arity() {
                    return Err(RootError::Expression(format!(
                        "'{name}' takes {} argument(s), got {}",
                        func.arity(),
                        args.len()
                    )));
                }
                Ok(Expr::Call(func, args))
            }
            other => Err(RootError::Expression(format!(
                "expected number, identifier, or '(', got {other:?}"
            ))),
        }
    }
}
