//! `!#if` 条件表达式求值
//! 语法：`true` / `false` / 平台标识符 / `!` / `&&` / `||` / 括号分组
//! 优先级：`!` > `&&` > `||`
//!
//! 宽松策略：无法识别的记号按 false 处理，不报错。
//! 表达式整体结构损坏（括号不配对、缺少操作数）时同样返回 false。

/// 词法记号
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Not,
    And,
    Or,
    LParen,
    RParen,
    Ident(&'a str),
    /// 无法识别的字符序列（求值为 false）
    Unknown(&'a str),
}

/// 条件表达式求值器
#[derive(Debug, Clone, Default)]
pub struct ExpressionEvaluator {
    platform: Option<String>,
}

impl ExpressionEvaluator {
    pub fn new(platform: Option<impl Into<String>>) -> Self {
        Self {
            platform: platform.map(Into::into),
        }
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    /// 对表达式求值
    pub fn evaluate(&self, expr: &str) -> bool {
        let tokens = tokenize(expr);
        if tokens.is_empty() {
            return false;
        }

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            platform: self.platform.as_deref(),
        };

        match parser.parse_or() {
            Some(value) if parser.pos == tokens.len() => value,
            _ => {
                log::debug!("Malformed !#if condition treated as false: {}", expr);
                false
            }
        }
    }
}

/// 便捷函数：对单个表达式求值
pub fn evaluate(expr: &str, platform: Option<&str>) -> bool {
    ExpressionEvaluator::new(platform).evaluate(expr)
}

fn tokenize(expr: &str) -> Vec<Token<'_>> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            b'!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            b'&' if bytes.get(i + 1) == Some(&b'&') => {
                tokens.push(Token::And);
                i += 2;
            }
            b'|' if bytes.get(i + 1) == Some(&b'|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            c if c.is_ascii_alphanumeric() || c == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push(Token::Ident(&expr[start..i]));
            }
            _ => {
                // 未知字符：吞掉直到下一个空白或运算符边界
                let start = i;
                i += 1;
                while i < bytes.len() && !is_boundary(bytes[i]) {
                    i += 1;
                }
                // 避免在多字节字符中间切片
                while !expr.is_char_boundary(i) {
                    i += 1;
                }
                tokens.push(Token::Unknown(&expr[start..i]));
            }
        }
    }

    tokens
}

fn is_boundary(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'(' | b')' | b'!' | b'&' | b'|')
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    platform: Option<&'t str>,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn parse_or(&mut self) -> Option<bool> {
        let mut value = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.parse_and()?;
            value = value || rhs;
        }
        Some(value)
    }

    fn parse_and(&mut self) -> Option<bool> {
        let mut value = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.parse_unary()?;
            value = value && rhs;
        }
        Some(value)
    }

    fn parse_unary(&mut self) -> Option<bool> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return self.parse_unary().map(|v| !v);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Option<bool> {
        let token = self.peek()?.clone();
        self.pos += 1;
        match token {
            Token::LParen => {
                let value = self.parse_or()?;
                if self.peek() != Some(&Token::RParen) {
                    return None;
                }
                self.pos += 1;
                Some(value)
            }
            Token::Ident("true") => Some(true),
            Token::Ident("false") => Some(false),
            Token::Ident(name) => Some(self.platform == Some(name)),
            Token::Unknown(raw) => {
                log::trace!("Unknown token in !#if condition: {}", raw);
                Some(false)
            }
            _ => None,
        }
    }
}
