use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxAdminRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxAboutRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxProjectRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxSkillRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxExperienceRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxVisitorRepo {
    pub pool: PgPool,
}
