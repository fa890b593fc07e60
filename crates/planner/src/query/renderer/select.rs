use crate::query::{
    ast::{
        common::JoinKind,
        select::{FromClause, JoinClause, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            col.render(r);
        }

        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        if let Some(filter) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            filter.render(r);
        }
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        r.render_table_ref(&self.table);
        r.render_alias(&self.alias);
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        let keyword = match self.kind {
            JoinKind::Inner => "INNER JOIN ",
            JoinKind::Left => "LEFT OUTER JOIN ",
            JoinKind::Right => "RIGHT OUTER JOIN ",
            JoinKind::Full => "FULL OUTER JOIN ",
        };
        r.sql.push_str(keyword);
        r.render_table_ref(&self.table);
        r.render_alias(&self.alias);
        r.sql.push_str(" ON ");
        self.on.render(r);
    }
}
