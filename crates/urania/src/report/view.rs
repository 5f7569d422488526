use crate::aspects::{normalize_chart_aspects, Aspect, AspectPhase, AspectStrength, MotionTable};
use crate::interpretation::{Atom, AtomIndex};
use crate::natal::{
    ChartAngle, Dominants, HouseSystem, NatalChart, NatalRequest, SubjectInfo, ZodiacType,
};
use crate::points::display_name;
use crate::zodiac::format_degree;

/// One row of the planets table.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetRow {
    pub token: String,
    pub name: String,
    pub sign: String,
    pub degree: String,
    pub house: u8,
    pub retrograde: bool,
    pub sign_atom: Option<Atom>,
    pub house_atom: Option<Atom>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AspectRow {
    pub aspect: Aspect,
    pub strength: AspectStrength,
    pub phase: AspectPhase,
    pub atom: Option<Atom>,
}

impl AspectRow {
    /// "Sun trine Moon"
    pub fn title(&self) -> String {
        format!(
            "{} {} {}",
            display_name(&self.aspect.p1),
            self.aspect.kind.label().to_lowercase(),
            display_name(&self.aspect.p2)
        )
    }
}

/// Ascendant or Midheaven section.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSection {
    pub angle: ChartAngle,
    pub name: String,
    pub degree: String,
    pub aspects: Vec<AspectRow>,
    pub atom: Option<Atom>,
}

/// Everything a report renders, resolved once from the chart.
#[derive(Debug, Clone)]
pub struct ReportView {
    pub subject: SubjectInfo,
    pub house_system: HouseSystem,
    pub zodiac_type: ZodiacType,
    pub chart_svg: Option<String>,
    pub planets: Vec<PlanetRow>,
    pub ascendant: AngleSection,
    pub midheaven: AngleSection,
    pub aspects: Vec<AspectRow>,
    pub themes: Vec<Atom>,
    pub dominants: Dominants,
}

impl ReportView {
    pub fn build(chart: &NatalChart, chart_svg: Option<String>) -> Self {
        let atoms = AtomIndex::from_payload(&chart.interpretation);
        let motion = MotionTable::from_chart(chart);

        let aspects: Vec<AspectRow> = normalize_chart_aspects(chart)
            .into_iter()
            .map(|aspect| AspectRow {
                strength: AspectStrength::from_orb(aspect.orb),
                phase: motion.phase(&aspect),
                atom: atoms.aspect(&aspect.p1, aspect.kind, &aspect.p2).cloned(),
                aspect,
            })
            .collect();

        let planets = chart
            .planets
            .iter()
            .map(|p| {
                let token = p.token();
                PlanetRow {
                    name: display_name(&token),
                    sign: p.sign.clone(),
                    degree: format_degree(p.pos),
                    house: p.house,
                    retrograde: p.retrograde,
                    sign_atom: atoms.planet_sign(&token, Some(&p.sign)).cloned(),
                    house_atom: atoms.planet_house(&token, Some(p.house)).cloned(),
                    token,
                }
            })
            .collect();

        let angle_section = |angle: ChartAngle| AngleSection {
            name: display_name(&angle.token),
            degree: format_degree(angle.pos),
            aspects: aspects
                .iter()
                .filter(|row| row.aspect.involves(&angle.token))
                .cloned()
                .collect(),
            atom: atoms.angle(&angle.token, Some(&angle.sign)).cloned(),
            angle,
        };
        let ascendant = angle_section(ChartAngle::from_longitude("ascendant", chart.angles.asc, 1));
        let midheaven = angle_section(ChartAngle::from_longitude("midheaven", chart.angles.mc, 10));

        let themes = atoms.themes().cloned().collect();
        let dominants = Dominants::resolve(&chart.dominants, &chart.planets);
        log::debug!(
            "report view: {} planets, {} aspects, {} themes",
            chart.planets.len(),
            aspects.len(),
            atoms.themes().count()
        );

        Self {
            subject: chart.subject.clone().unwrap_or_default(),
            house_system: HouseSystem::default(),
            zodiac_type: ZodiacType::default(),
            chart_svg,
            planets,
            ascendant,
            midheaven,
            aspects,
            themes,
            dominants,
        }
    }

    /// Build with the cover metadata taken from the request that produced
    /// the chart, which is authoritative over the echoed subject block.
    pub fn for_request(
        request: &NatalRequest,
        chart: &NatalChart,
        chart_svg: Option<String>,
    ) -> Self {
        let mut view = Self::build(chart, chart_svg);
        view.subject = SubjectInfo {
            name: request.name.clone(),
            birth_date: Some(request.birth_date.clone()),
            birth_time: Some(request.birth_time.clone()),
            city: Some(request.city.clone()),
            latitude: Some(request.latitude),
            longitude: Some(request.longitude),
            timezone: Some(request.timezone.clone()),
        };
        view.house_system = request.house_system;
        view.zodiac_type = request.zodiac_type;
        view
    }
}
