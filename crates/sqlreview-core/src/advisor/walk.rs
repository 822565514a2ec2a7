//! Generic tree-walk driver.
//!
//! The driver owns traversal; a [`Checker`] only declares the node kinds it cares
//! about and receives those nodes as the tree is walked, a query ahead of the
//! queries nested in it. Rules therefore never re-implement statement/query
//! recursion.

use super::Context;
use crate::types::Advice;
use sqlparser::ast::{
    Assignment, ColumnDef, CreateTable, Expr, FromTable, FunctionArg, FunctionArgExpr,
    FunctionArgumentClause, FunctionArguments, GroupByExpr, HavingBound, JoinConstraint,
    JoinOperator, MergeAction, MergeInsertKind, ObjectName, ObjectType, OrderByKind, OutputClause,
    Query, SelectItem, SetExpr, Statement, TableFactor, TableWithJoins, UpdateTableFromKind,
};
use sqlparser::tokenizer::Location;

/// Kinds of nodes a checker can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    DropTable,
    CreateTable,
    ColumnDef,
    Update,
    Delete,
    Query,
}

/// A node handed to a checker.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// `DROP TABLE a, b`
    DropTable { names: &'a [ObjectName] },
    CreateTable(&'a CreateTable),
    /// A column definition inside `CREATE TABLE`
    ColumnDef {
        table: &'a ObjectName,
        column: &'a ColumnDef,
    },
    Update { selection: Option<&'a Expr> },
    Delete { selection: Option<&'a Expr> },
    /// Any query, top-level or nested (CTEs, set operations, subqueries)
    Query(&'a Query),
}

impl Node<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::DropTable { .. } => NodeKind::DropTable,
            Node::CreateTable(_) => NodeKind::CreateTable,
            Node::ColumnDef { .. } => NodeKind::ColumnDef,
            Node::Update { .. } => NodeKind::Update,
            Node::Delete { .. } => NodeKind::Delete,
            Node::Query(_) => NodeKind::Query,
        }
    }
}

/// Advice gathered by a checker, keyed by where in the statement it was found.
///
/// Queries are visited before the queries nested in them, so visit order is not
/// source order. [`Findings::into_sorted`] restores source order.
#[derive(Debug, Default)]
pub struct Findings {
    entries: Vec<(Location, Advice)>,
}

impl Findings {
    /// Records `advice` found at `at`. A zero location means "unknown".
    pub fn push(&mut self, at: Location, advice: Advice) {
        self.entries.push((at, advice));
    }

    /// Advice ordered by position in the statement. Unlocated entries come first
    /// and ties keep visit order.
    pub fn into_sorted(mut self) -> Vec<Advice> {
        self.entries.sort_by_key(|(at, _)| (at.line, at.column));
        self.entries.into_iter().map(|(_, advice)| advice).collect()
    }
}

/// Stateful per-invocation visitor for one rule.
pub trait Checker {
    /// Node kinds routed to [`Checker::visit`].
    fn interests(&self) -> &'static [NodeKind];

    fn visit(&mut self, node: Node<'_>, ctx: &Context<'_>);

    /// Findings accumulated over the walk.
    fn into_findings(self) -> Findings;
}

/// Walks `statements` once, routing subscribed nodes to `checker`.
pub fn walk<C: Checker>(statements: &[Statement], ctx: &Context<'_>, checker: &mut C) {
    let mut walker = Walker {
        interests: checker.interests(),
        checker,
        ctx,
    };
    for statement in statements {
        walker.statement(statement);
    }
}

struct Walker<'c, 'x, C> {
    interests: &'static [NodeKind],
    checker: &'c mut C,
    ctx: &'c Context<'x>,
}

impl<C: Checker> Walker<'_, '_, C> {
    fn emit(&mut self, node: Node<'_>) {
        if self.interests.contains(&node.kind()) {
            self.checker.visit(node, self.ctx);
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Drop {
                object_type: ObjectType::Table,
                names,
                ..
            } => self.emit(Node::DropTable { names }),
            Statement::CreateTable(create) => {
                self.emit(Node::CreateTable(create));
                for column in &create.columns {
                    self.emit(Node::ColumnDef {
                        table: &create.name,
                        column,
                    });
                }
                if let Some(query) = &create.query {
                    self.query(query);
                }
            }
            Statement::Update {
                table,
                assignments,
                from,
                selection,
                returning,
                limit,
                ..
            } => {
                self.emit(Node::Update {
                    selection: selection.as_ref(),
                });
                self.table_with_joins(table);
                self.assignments(assignments);
                if let Some(
                    UpdateTableFromKind::BeforeSet(tables) | UpdateTableFromKind::AfterSet(tables),
                ) = from
                {
                    for table in tables {
                        self.table_with_joins(table);
                    }
                }
                if let Some(selection) = selection {
                    self.expr(selection);
                }
                if let Some(returning) = returning {
                    self.select_items(returning);
                }
                if let Some(limit) = limit {
                    self.expr(limit);
                }
            }
            Statement::Delete(delete) => {
                self.emit(Node::Delete {
                    selection: delete.selection.as_ref(),
                });
                match &delete.from {
                    FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => {
                        for table in tables {
                            self.table_with_joins(table);
                        }
                    }
                }
                if let Some(using) = &delete.using {
                    for table in using {
                        self.table_with_joins(table);
                    }
                }
                if let Some(selection) = &delete.selection {
                    self.expr(selection);
                }
                if let Some(returning) = &delete.returning {
                    self.select_items(returning);
                }
                for order_by in &delete.order_by {
                    self.expr(&order_by.expr);
                }
                if let Some(limit) = &delete.limit {
                    self.expr(limit);
                }
            }
            Statement::Query(query) => self.query(query),
            Statement::Insert(insert) => {
                if let Some(source) = &insert.source {
                    self.query(source);
                }
                self.assignments(&insert.assignments);
                if let Some(partitioned) = &insert.partitioned {
                    for expr in partitioned {
                        self.expr(expr);
                    }
                }
                if let Some(returning) = &insert.returning {
                    self.select_items(returning);
                }
            }
            Statement::Merge {
                table,
                source,
                on,
                clauses,
                output,
                ..
            } => {
                self.table_factor(table);
                self.table_factor(source);
                self.expr(on);
                for clause in clauses {
                    if let Some(predicate) = &clause.predicate {
                        self.expr(predicate);
                    }
                    match &clause.action {
                        MergeAction::Insert(insert) => {
                            if let MergeInsertKind::Values(values) = &insert.kind {
                                for row in &values.rows {
                                    for expr in row {
                                        self.expr(expr);
                                    }
                                }
                            }
                        }
                        MergeAction::Update { assignments } => self.assignments(assignments),
                        MergeAction::Delete => {}
                    }
                }
                if let Some(
                    OutputClause::Output { select_items, .. }
                    | OutputClause::Returning { select_items },
                ) = output
                {
                    self.select_items(select_items);
                }
            }
            Statement::CreateView { query, .. } => self.query(query),
            _ => {}
        }
    }

    fn query(&mut self, query: &Query) {
        self.emit(Node::Query(query));
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.query(&cte.query);
            }
        }
        self.set_expr(&query.body);
        if let Some(order_by) = &query.order_by {
            if let OrderByKind::Expressions(exprs) = &order_by.kind {
                for order_by_expr in exprs {
                    self.expr(&order_by_expr.expr);
                }
            }
        }
    }

    fn set_expr(&mut self, body: &SetExpr) {
        match body {
            SetExpr::Select(select) => {
                self.select_items(&select.projection);
                for table in &select.from {
                    self.table_with_joins(table);
                }
                if let Some(selection) = &select.selection {
                    self.expr(selection);
                }
                if let GroupByExpr::Expressions(exprs, _) = &select.group_by {
                    for expr in exprs {
                        self.expr(expr);
                    }
                }
                if let Some(having) = &select.having {
                    self.expr(having);
                }
                if let Some(qualify) = &select.qualify {
                    self.expr(qualify);
                }
            }
            SetExpr::Query(query) => self.query(query),
            SetExpr::SetOperation { left, right, .. } => {
                self.set_expr(left);
                self.set_expr(right);
            }
            SetExpr::Values(values) => {
                for row in &values.rows {
                    for expr in row {
                        self.expr(expr);
                    }
                }
            }
            SetExpr::Insert(statement)
            | SetExpr::Update(statement)
            | SetExpr::Delete(statement)
            | SetExpr::Merge(statement) => self.statement(statement),
            _ => {}
        }
    }

    fn select_items(&mut self, items: &[SelectItem]) {
        for item in items {
            if let SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } = item {
                self.expr(expr);
            }
        }
    }

    fn assignments(&mut self, assignments: &[Assignment]) {
        for assignment in assignments {
            self.expr(&assignment.value);
        }
    }

    fn table_with_joins(&mut self, table: &TableWithJoins) {
        self.table_factor(&table.relation);
        for join in &table.joins {
            self.table_factor(&join.relation);
            self.join_constraint(&join.join_operator);
        }
    }

    fn join_constraint(&mut self, op: &JoinOperator) {
        let constraint = match op {
            JoinOperator::Join(c)
            | JoinOperator::Inner(c)
            | JoinOperator::Left(c)
            | JoinOperator::LeftOuter(c)
            | JoinOperator::Right(c)
            | JoinOperator::RightOuter(c)
            | JoinOperator::FullOuter(c)
            | JoinOperator::CrossJoin(c)
            | JoinOperator::Semi(c)
            | JoinOperator::LeftSemi(c)
            | JoinOperator::RightSemi(c)
            | JoinOperator::Anti(c)
            | JoinOperator::LeftAnti(c)
            | JoinOperator::RightAnti(c)
            | JoinOperator::StraightJoin(c) => c,
            JoinOperator::AsOf { constraint, .. } => constraint,
            JoinOperator::CrossApply | JoinOperator::OuterApply => return,
        };
        if let JoinConstraint::On(expr) = constraint {
            self.expr(expr);
        }
    }

    fn table_factor(&mut self, factor: &TableFactor) {
        match factor {
            TableFactor::Derived { subquery, .. } => self.query(subquery),
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.table_with_joins(table_with_joins),
            TableFactor::Pivot { table, .. }
            | TableFactor::Unpivot { table, .. }
            | TableFactor::MatchRecognize { table, .. } => self.table_factor(table),
            _ => {}
        }
    }

    /// Descends into expressions only to find nested queries.
    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::BinaryOp { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            Expr::UnaryOp { expr: inner, .. }
            | Expr::Nested(inner)
            | Expr::Cast { expr: inner, .. }
            | Expr::IsNull(inner)
            | Expr::IsNotNull(inner) => self.expr(inner),
            Expr::Case {
                operand,
                conditions,
                else_result,
                ..
            } => {
                if let Some(operand) = operand {
                    self.expr(operand);
                }
                for case_when in conditions {
                    self.expr(&case_when.condition);
                    self.expr(&case_when.result);
                }
                if let Some(else_result) = else_result {
                    self.expr(else_result);
                }
            }
            Expr::Function(func) => self.function_args(&func.args),
            Expr::InSubquery {
                expr: inner,
                subquery,
                ..
            } => {
                self.expr(inner);
                self.query(subquery);
            }
            Expr::Subquery(subquery) | Expr::Exists { subquery, .. } => self.query(subquery),
            Expr::Between {
                expr, low, high, ..
            } => {
                self.expr(expr);
                self.expr(low);
                self.expr(high);
            }
            Expr::InList { expr, list, .. } => {
                self.expr(expr);
                for item in list {
                    self.expr(item);
                }
            }
            _ => {}
        }
    }

    fn function_args(&mut self, args: &FunctionArguments) {
        match args {
            FunctionArguments::Subquery(query) => self.query(query),
            FunctionArguments::List(arg_list) => {
                for arg in &arg_list.args {
                    match arg {
                        FunctionArg::Unnamed(FunctionArgExpr::Expr(expr))
                        | FunctionArg::Named {
                            arg: FunctionArgExpr::Expr(expr),
                            ..
                        } => self.expr(expr),
                        FunctionArg::ExprNamed { name, arg, .. } => {
                            self.expr(name);
                            if let FunctionArgExpr::Expr(expr) = arg {
                                self.expr(expr);
                            }
                        }
                        _ => {}
                    }
                }
                for clause in &arg_list.clauses {
                    match clause {
                        FunctionArgumentClause::OrderBy(order_by_exprs) => {
                            for order_by_expr in order_by_exprs {
                                self.expr(&order_by_expr.expr);
                            }
                        }
                        FunctionArgumentClause::Limit(expr)
                        | FunctionArgumentClause::Having(HavingBound(_, expr)) => self.expr(expr),
                        _ => {}
                    }
                }
            }
            FunctionArguments::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DialectNormalizer;
    use crate::parser::{ParseFrontEnd, SqlParserFrontEnd};
    use crate::types::{AdviceCode, Dialect, RuleDefinition, RuleLevel, RuleType, Status};

    #[derive(Default)]
    struct KindRecorder {
        seen: Vec<NodeKind>,
    }

    impl Checker for KindRecorder {
        fn interests(&self) -> &'static [NodeKind] {
            &[
                NodeKind::DropTable,
                NodeKind::CreateTable,
                NodeKind::ColumnDef,
                NodeKind::Update,
                NodeKind::Delete,
                NodeKind::Query,
            ]
        }

        fn visit(&mut self, node: Node<'_>, _ctx: &Context<'_>) {
            self.seen.push(node.kind());
        }

        fn into_findings(self) -> Findings {
            Findings::default()
        }
    }

    struct QueryOnly(usize);

    impl Checker for QueryOnly {
        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::Query]
        }

        fn visit(&mut self, node: Node<'_>, _ctx: &Context<'_>) {
            assert_eq!(node.kind(), NodeKind::Query);
            self.0 += 1;
        }

        fn into_findings(self) -> Findings {
            Findings::default()
        }
    }

    fn walk_sql<C: Checker>(sql: &str, checker: &mut C) {
        let tree = SqlParserFrontEnd.parse(Dialect::Postgres, sql).unwrap();
        let rule = RuleDefinition::new(RuleType::NAMING_TABLE, RuleLevel::Warning);
        let normalizer = DialectNormalizer::new(Dialect::Postgres);
        let ctx = Context {
            tree: &tree,
            rule: &rule,
            dialect: Dialect::Postgres,
            statement_index: 0,
            statement_line: 1,
            current_database: None,
            normalizer: &normalizer,
        };
        walk(&tree.statements, &ctx, checker);
    }

    #[test]
    fn test_create_table_emits_columns_in_order() {
        let mut recorder = KindRecorder::default();
        walk_sql("CREATE TABLE t (a INT, b TEXT)", &mut recorder);
        assert_eq!(
            recorder.seen,
            vec![
                NodeKind::CreateTable,
                NodeKind::ColumnDef,
                NodeKind::ColumnDef
            ]
        );
    }

    #[test]
    fn test_drop_view_is_not_a_drop_table() {
        let mut recorder = KindRecorder::default();
        walk_sql("DROP VIEW v", &mut recorder);
        assert!(recorder.seen.is_empty());
    }

    #[test]
    fn test_nested_queries_are_visited() {
        let mut checker = QueryOnly(0);
        walk_sql(
            "WITH c AS (SELECT 1) SELECT * FROM (SELECT 2) d WHERE EXISTS (SELECT 3) UNION SELECT 4",
            &mut checker,
        );
        assert_eq!(checker.0, 4);
    }

    #[test]
    fn test_projection_subquery_is_visited() {
        let mut checker = QueryOnly(0);
        walk_sql("SELECT (SELECT x FROM t LIMIT 5000)", &mut checker);
        assert_eq!(checker.0, 2);
    }

    #[test]
    fn test_join_constraint_subquery_is_visited() {
        let mut checker = QueryOnly(0);
        walk_sql(
            "SELECT * FROM t JOIN u ON u.id IN (SELECT id FROM v LIMIT 9999)",
            &mut checker,
        );
        assert_eq!(checker.0, 2);
    }

    #[test]
    fn test_subqueries_in_expressions_are_visited() {
        let mut checker = QueryOnly(0);
        walk_sql(
            "SELECT CASE WHEN a IS NULL THEN (SELECT 1) ELSE 0 END, \
             coalesce((SELECT 2), 0), CAST((SELECT 3) AS TEXT) \
             FROM t \
             WHERE b IN (1, (SELECT 4)) \
             GROUP BY a HAVING count(*) > (SELECT 5) \
             ORDER BY (SELECT 6)",
            &mut checker,
        );
        assert_eq!(checker.0, 7);
    }

    #[test]
    fn test_update_assignments_and_from_are_visited() {
        let mut recorder = KindRecorder::default();
        walk_sql(
            "UPDATE t SET a = (SELECT 1) FROM (SELECT 2 AS id) s WHERE t.id = s.id",
            &mut recorder,
        );
        assert_eq!(
            recorder.seen,
            vec![NodeKind::Update, NodeKind::Query, NodeKind::Query]
        );
    }

    #[test]
    fn test_insert_values_are_visited() {
        let mut checker = QueryOnly(0);
        walk_sql("INSERT INTO t (a) VALUES ((SELECT 1))", &mut checker);
        // The VALUES body is itself a query.
        assert_eq!(checker.0, 2);
    }

    #[test]
    fn test_delete_using_is_visited() {
        let mut recorder = KindRecorder::default();
        walk_sql(
            "DELETE FROM t USING (SELECT 1 AS id) s WHERE t.id = s.id",
            &mut recorder,
        );
        assert_eq!(recorder.seen, vec![NodeKind::Delete, NodeKind::Query]);
    }

    #[test]
    fn test_merge_source_is_visited() {
        let mut checker = QueryOnly(0);
        walk_sql(
            "MERGE INTO t USING (SELECT 1 AS id) s ON t.id = s.id \
             WHEN MATCHED THEN UPDATE SET a = (SELECT 2)",
            &mut checker,
        );
        assert_eq!(checker.0, 2);
    }

    #[test]
    fn test_findings_are_sorted_by_position() {
        let mut findings = Findings::default();
        let at = |line, column| Location { line, column };
        findings.push(at(1, 30), Advice::new(Status::Warning, AdviceCode(1), "t", "outer"));
        findings.push(at(1, 12), Advice::new(Status::Warning, AdviceCode(1), "t", "inner"));
        findings.push(at(0, 0), Advice::new(Status::Warning, AdviceCode(1), "t", "unlocated"));
        let contents: Vec<_> = findings
            .into_sorted()
            .into_iter()
            .map(|advice| advice.content)
            .collect();
        assert_eq!(contents, vec!["unlocated", "inner", "outer"]);
    }

    #[test]
    fn test_delete_subquery_is_visited_after_delete() {
        let mut recorder = KindRecorder::default();
        walk_sql(
            "DELETE FROM t WHERE id IN (SELECT id FROM u)",
            &mut recorder,
        );
        assert_eq!(recorder.seen, vec![NodeKind::Delete, NodeKind::Query]);
    }
}
