//! Recursive-descent parser for the grammar in spec.md §4.11.

use crate::error::{Error, Result};
use crate::query::{AggregateSpec, Expr, Op, Predicate, SortField, Term};
use crate::record::{FieldType, Value};

use super::ast::*;
use super::lexer::{Lexer, Token};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn parse(sql: &str) -> Result<Statement> {
        let tokens = Lexer::new(sql).tokenize()?;
        let mut parser = Parser { tokens, pos: 0 };
        let stmt = parser.parse_statement()?;
        if parser.peek() == &Token::Semicolon {
            parser.advance();
        }
        if parser.peek() != &Token::Eof {
            return Err(Error::syntax(format!("unexpected trailing tokens near {:?}", parser.peek())));
        }
        Ok(stmt)
    }

    /// Parses just the `Query` production, for `CREATE VIEW ... AS <query>`.
    pub fn parse_query(sql: &str) -> Result<QueryData> {
        let tokens = Lexer::new(sql).tokenize()?;
        let mut parser = Parser { tokens, pos: 0 };
        let query = parser.parse_query_impl()?;
        Ok(query)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(Error::syntax(format!("expected {:?}, found {:?}", expected, self.peek())))
        }
    }

    fn consume_identifier(&mut self) -> Result<String> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(Error::syntax(format!("expected identifier, found {:?}", other))),
        }
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Token::Select => Ok(Statement::Query(self.parse_query_impl()?)),
            Token::Insert => Ok(Statement::Insert(self.parse_insert()?)),
            Token::Delete => Ok(Statement::Delete(self.parse_delete()?)),
            Token::Update => Ok(Statement::Modify(self.parse_modify()?)),
            Token::Create => self.parse_create(),
            other => Err(Error::syntax(format!("expected a statement, found {:?}", other.clone()))),
        }
    }

    // ---- Query ----

    fn parse_query_impl(&mut self) -> Result<QueryData> {
        self.expect(Token::Select)?;
        let select_list = self.parse_select_list()?;
        self.expect(Token::From)?;
        let tables = self.parse_ident_list()?;

        let pred = if *self.peek() == Token::Where {
            self.advance();
            self.parse_predicate()?
        } else {
            Predicate::new()
        };

        let group_by = if *self.peek() == Token::Group {
            self.advance();
            self.expect(Token::By)?;
            self.parse_ident_list()?
        } else {
            Vec::new()
        };

        let having = if *self.peek() == Token::Having {
            self.advance();
            Some(self.parse_predicate()?)
        } else {
            None
        };

        let order_by = if *self.peek() == Token::Order {
            self.advance();
            self.expect(Token::By)?;
            self.parse_order_list()?
        } else {
            Vec::new()
        };

        Ok(QueryData { select_list, tables, pred, group_by, having, order_by })
    }

    fn parse_select_list(&mut self) -> Result<Vec<SelectItem>> {
        let mut items = vec![self.parse_select_item()?];
        while *self.peek() == Token::Comma {
            self.advance();
            items.push(self.parse_select_item()?);
        }
        Ok(items)
    }

    fn parse_select_item(&mut self) -> Result<SelectItem> {
        let ctor: Option<fn(String) -> AggregateSpec> = match self.peek() {
            Token::Max => Some(AggregateSpec::Max),
            Token::Min => Some(AggregateSpec::Min),
            Token::Count => Some(AggregateSpec::Count),
            Token::Avg => Some(AggregateSpec::Avg),
            Token::Sum => Some(AggregateSpec::Sum),
            _ => None,
        };
        match ctor {
            Some(make) => {
                self.advance();
                self.expect(Token::LeftParen)?;
                let field = self.consume_identifier()?;
                self.expect(Token::RightParen)?;
                Ok(SelectItem::Aggregate(make(field)))
            }
            None => Ok(SelectItem::Field(self.consume_identifier()?)),
        }
    }

    fn parse_ident_list(&mut self) -> Result<Vec<String>> {
        let mut idents = vec![self.consume_identifier()?];
        while *self.peek() == Token::Comma {
            self.advance();
            idents.push(self.consume_identifier()?);
        }
        Ok(idents)
    }

    fn parse_order_list(&mut self) -> Result<Vec<SortField>> {
        let mut fields = vec![self.parse_sort_field()?];
        while *self.peek() == Token::Comma {
            self.advance();
            fields.push(self.parse_sort_field()?);
        }
        Ok(fields)
    }

    fn parse_sort_field(&mut self) -> Result<SortField> {
        let field = self.consume_identifier()?;
        let desc = match self.peek() {
            Token::Asc => { self.advance(); false }
            Token::Desc => { self.advance(); true }
            _ => false,
        };
        Ok(SortField { field, desc })
    }

    // ---- Predicates ----

    fn parse_predicate(&mut self) -> Result<Predicate> {
        let mut pred = Predicate::of(self.parse_term()?);
        while *self.peek() == Token::And {
            self.advance();
            pred.conjoin_with(Predicate::of(self.parse_term()?));
        }
        Ok(pred)
    }

    fn parse_term(&mut self) -> Result<Term> {
        let lhs = self.parse_expr()?;
        let op = self.parse_op()?;
        let rhs = self.parse_expr()?;
        Ok(Term::new(lhs, op, rhs))
    }

    fn parse_op(&mut self) -> Result<Op> {
        let op = match self.peek() {
            Token::Eq => Op::Eq,
            Token::Ne => Op::Ne,
            Token::Lt => Op::Lt,
            Token::Le => Op::Le,
            Token::Gt => Op::Gt,
            Token::Ge => Op::Ge,
            other => return Err(Error::syntax(format!("expected a comparison operator, found {:?}", other.clone()))),
        };
        self.advance();
        Ok(op)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(Expr::Field(name))
            }
            _ => Ok(Expr::Constant(self.parse_constant()?)),
        }
    }

    fn parse_constant(&mut self) -> Result<Value> {
        match self.advance() {
            Token::IntLiteral(n) => Ok(Value::Int(n as i32)),
            Token::StringLiteral(s) => Ok(Value::Varchar(s)),
            Token::DateLiteral(ms) => Ok(Value::Date(ms)),
            Token::True => Ok(Value::Boolean(true)),
            Token::False => Ok(Value::Boolean(false)),
            other => Err(Error::syntax(format!("expected a constant, found {:?}", other))),
        }
    }

    // ---- Insert / Delete / Modify ----

    fn parse_insert(&mut self) -> Result<InsertData> {
        self.expect(Token::Insert)?;
        self.expect(Token::Into)?;
        let table = self.consume_identifier()?;
        self.expect(Token::LeftParen)?;
        let fields = self.parse_ident_list()?;
        self.expect(Token::RightParen)?;
        self.expect(Token::Values)?;
        self.expect(Token::LeftParen)?;
        let values = self.parse_const_list()?;
        self.expect(Token::RightParen)?;
        if fields.len() != values.len() {
            return Err(Error::syntax("INSERT field list and value list have different lengths"));
        }
        Ok(InsertData { table, fields, values })
    }

    fn parse_const_list(&mut self) -> Result<Vec<Value>> {
        let mut values = vec![self.parse_constant()?];
        while *self.peek() == Token::Comma {
            self.advance();
            values.push(self.parse_constant()?);
        }
        Ok(values)
    }

    fn parse_delete(&mut self) -> Result<DeleteData> {
        self.expect(Token::Delete)?;
        self.expect(Token::From)?;
        let table = self.consume_identifier()?;
        let pred = if *self.peek() == Token::Where {
            self.advance();
            self.parse_predicate()?
        } else {
            Predicate::new()
        };
        Ok(DeleteData { table, pred })
    }

    fn parse_modify(&mut self) -> Result<ModifyData> {
        self.expect(Token::Update)?;
        let table = self.consume_identifier()?;
        self.expect(Token::Set)?;
        let field = self.consume_identifier()?;
        self.expect(Token::Eq)?;
        let new_value = self.parse_expr()?;
        let pred = if *self.peek() == Token::Where {
            self.advance();
            self.parse_predicate()?
        } else {
            Predicate::new()
        };
        Ok(ModifyData { table, field, new_value, pred })
    }

    // ---- Create ----

    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(Token::Create)?;
        match self.peek() {
            Token::Table => Ok(Statement::CreateTable(self.parse_create_table()?)),
            Token::View => Ok(Statement::CreateView(self.parse_create_view()?)),
            Token::Index => Ok(Statement::CreateIndex(self.parse_create_index()?)),
            other => Err(Error::syntax(format!("expected TABLE, VIEW, or INDEX after CREATE, found {:?}", other.clone()))),
        }
    }

    fn parse_create_table(&mut self) -> Result<CreateTableData> {
        self.expect(Token::Table)?;
        let table = self.consume_identifier()?;
        self.expect(Token::LeftParen)?;
        let mut fields = vec![self.parse_field_def()?];
        while *self.peek() == Token::Comma {
            self.advance();
            fields.push(self.parse_field_def()?);
        }
        self.expect(Token::RightParen)?;
        Ok(CreateTableData { table, fields })
    }

    fn parse_field_def(&mut self) -> Result<FieldDef> {
        let name = self.consume_identifier()?;
        let ftype = match self.advance() {
            Token::Int => FieldType::Integer,
            Token::Short => FieldType::Short,
            Token::Long => FieldType::Long,
            Token::Bool => FieldType::Boolean,
            Token::Date => FieldType::Date,
            Token::Varchar => {
                self.expect(Token::LeftParen)?;
                let len = match self.advance() {
                    Token::IntLiteral(n) if n > 0 => n as usize,
                    other => return Err(Error::syntax(format!("expected a positive length, found {:?}", other))),
                };
                self.expect(Token::RightParen)?;
                FieldType::Varchar(len)
            }
            other => return Err(Error::syntax(format!("expected a field type, found {:?}", other))),
        };
        Ok(FieldDef { name, ftype })
    }

    fn parse_create_view(&mut self) -> Result<CreateViewData> {
        self.expect(Token::View)?;
        let view = self.consume_identifier()?;
        self.expect(Token::As)?;
        let query = self.parse_query_impl()?;
        Ok(CreateViewData { view, query })
    }

    fn parse_create_index(&mut self) -> Result<CreateIndexData> {
        self.expect(Token::Index)?;
        let index = self.consume_identifier()?;
        self.expect(Token::On)?;
        let table = self.consume_identifier()?;
        self.expect(Token::LeftParen)?;
        let field = self.consume_identifier()?;
        self.expect(Token::RightParen)?;
        Ok(CreateIndexData { index, table, field })
    }
}
