/// Keywords and punctuation of the query language, rendered in lower case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
pub enum Token {
    SELECT,
    FROM,
    WHERE,
    AND,
    OR,
    NOT,
    IN,
    LIKE,
    IS,
    NULL,
    EXISTS,
    JOIN,
    FETCH,
    INNER,
    LEFT,
    RIGHT,
    ON,
    AS,
    ORDER_BY,
    GROUP_BY,
    ASC,
    DESC,
    LPAREN,
    RPAREN,
    COMMA,
    EQ,
    NE,
    LT,
    LE,
    GT,
    GE,
}

impl Token {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::SELECT => "select",
            Token::FROM => "from",
            Token::WHERE => "where",
            Token::AND => "and",
            Token::OR => "or",
            Token::NOT => "not",
            Token::IN => "in",
            Token::LIKE => "like",
            Token::IS => "is",
            Token::NULL => "null",
            Token::EXISTS => "exists",
            Token::JOIN => "join",
            Token::FETCH => "fetch",
            Token::INNER => "inner",
            Token::LEFT => "left",
            Token::RIGHT => "right",
            Token::ON => "on",
            Token::AS => "as",
            Token::ORDER_BY => "order by",
            Token::GROUP_BY => "group by",
            Token::ASC => "asc",
            Token::DESC => "desc",
            Token::LPAREN => "(",
            Token::RPAREN => ")",
            Token::COMMA => ",",
            Token::EQ => "=",
            Token::NE => "<>",
            Token::LT => "<",
            Token::LE => "<=",
            Token::GT => ">",
            Token::GE => ">=",
        }
    }

    /// Comparison operators get a space on both sides
    pub const fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::EQ | Token::NE | Token::LT | Token::LE | Token::GT | Token::GE
        )
    }
}
